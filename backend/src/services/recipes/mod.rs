//! Read-only access to the recipe collection.
//!
//! The shopping-list builder resolves recipe ids against this collection;
//! recipe management itself (create/update/delete, validation) lives in the
//! surrounding system and is not part of this service.

mod get;
mod list;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/recipes";

/// Configures and returns the Actix `Scope` for the recipe read routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/{recipe_id}", get().to(get::process))
}
