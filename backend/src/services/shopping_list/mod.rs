//! # Shopping List Service Module
//!
//! This module aggregates everything around shopping-list generation: the
//! ingredient pipeline (aggregation, normalization, external consolidation),
//! the checklist document rendering, and the HTTP surface over the
//! generation records.
//!
//! ## Sub-modules:
//! - `aggregate`: flattens selected recipes' ingredient groups into one
//!   provenance-tagged list.
//! - `normalize`: per-line cleanup of names and amounts.
//! - `consolidate`: the external merge call and its defensive reply parsing.
//! - `pdf`: renders the consolidated list into the paginated checklist
//!   document.
//! - `generate`: the `POST /shopping-list` handler tying the pipeline
//!   together.
//! - `get_all` / `update_notes`: read and annotate the persisted generation
//!   records.

pub mod aggregate;
pub mod consolidate;
mod generate;
mod get_all;
pub mod normalize;
pub mod pdf;
mod update_notes;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

/// The base path for the shopping-list API endpoints.
const API_PATH: &str = "/api";

/// Configures and returns the Actix `Scope` for the shopping-list routes.
///
/// # Registered Routes:
///
/// *   **`POST /shopping-list`**:
///     - **Handler**: `generate::process`
///     - **Description**: Generates a checklist document for the recipe ids
///       in the request body, persists a generation record, and returns the
///       document URL. The requester identity is taken from the `X-Username`
///       header.
///
/// *   **`GET /shoppingLists`**:
///     - **Handler**: `get_all::process`
///     - **Description**: Returns every generation record.
///
/// *   **`PUT /shoppingLists/{list_id}`**:
///     - **Handler**: `update_notes::process`
///     - **Description**: Replaces the free-text notes of one record; all
///       other record fields are immutable.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/shopping-list", post().to(generate::process))
        .route("/shoppingLists", get().to(get_all::process))
        .route("/shoppingLists/{list_id}", put().to(update_notes::process))
}
