//! # Shopping List Generation Service
//!
//! This module provides the `POST /api/shopping-list` endpoint, which turns a
//! recipe selection into a rendered checklist document plus a persisted
//! generation record.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: the `process` handler receives `{ recipeIds: [...] }`
//!     and the requester identity from the `X-Username` header (authentication
//!     itself happens upstream; a missing header is the anonymous placeholder).
//!
//! 2.  **Resolution & aggregation**: the ids are resolved against the recipe
//!     collection; recipes without usable ingredients are filtered out and the
//!     remainder is flattened into provenance-tagged ingredient lines. An
//!     empty remainder rejects the request with `400`.
//!
//! 3.  **Normalization & consolidation**: every line is cleaned up, then the
//!     whole list is sent to the external merge call. A failed call degrades
//!     to an empty consolidated list; it never fails the request.
//!
//! 4.  **Document rendering**: the checklist is rendered and written on a
//!     blocking worker thread via `tokio::task::spawn_blocking`, keeping the
//!     PDF work off the async runtime. A write failure is a `500` and nothing
//!     is persisted.
//!
//! 5.  **Record persistence**: only after the document write has completed is
//!     the generation record appended to the `shoppingLists` collection, so a
//!     persisted record always points at an existing file. If the append
//!     itself fails, the orphaned document is left in place (harmless dead
//!     storage) and the request answers `500`.

use crate::config::AppConfig;
use crate::services::shopping_list::{aggregate, consolidate, normalize, pdf};
use crate::store::Store;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use common::model::shopping_list::{IngredientLine, ShoppingListRecord};
use log::{error, info};
use serde_json::{json, Value};
use std::path::Path;

/// Timestamp format shared by record ids and document filenames; second
/// resolution keeps the ids human-sortable.
const ID_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Placeholder identity for unauthenticated requesters.
const ANONYMOUS: &str = "anonymous";

/// The Actix web handler for `POST /api/shopping-list`.
///
/// # Returns
/// - `200 OK` with `{ "url": ... }` pointing at the rendered document.
/// - `400 Bad Request` when `recipeIds` is missing, not an array or empty,
///   or when no selected recipe has ingredients.
/// - `500 Internal Server Error` when the document write or the record
///   append fails.
pub(crate) async fn process(
    req: HttpRequest,
    payload: web::Json<Value>,
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    client: web::Data<reqwest::Client>,
) -> impl Responder {
    let recipe_ids = match parse_recipe_ids(&payload) {
        Some(ids) => ids,
        None => {
            return HttpResponse::BadRequest().json(json!({"error": "recipes array is required"}))
        }
    };
    let username = requester(&req);

    let selected = store.recipes_by_ids(&recipe_ids).await;
    let aggregation = match aggregate::aggregate(&selected) {
        Some(aggregation) => aggregation,
        None => {
            info!(
                "shopping list for {} rejected, no valid recipes among {:?}",
                username, recipe_ids
            );
            return HttpResponse::BadRequest()
                .json(json!({"error": "No valid recipes with ingredients found"}));
        }
    };

    let lines: Vec<IngredientLine> = aggregation.lines.iter().map(normalize::normalize_line).collect();
    let consolidated = consolidate::consolidate(&client, &config, &lines).await;

    let created_at = Utc::now();
    let record_id = store
        .free_record_id(&created_at.format(ID_FORMAT).to_string())
        .await;
    let filename = format!("shopping_{}_{}.pdf", sanitize_filename(&username), record_id);
    let output_path = Path::new(&config.lists_dir).join(&filename);

    let header = pdf::ListHeader {
        username: username.clone(),
        recipe_names: aggregation.recipe_names,
    };
    let fonts_dir = config.fonts_dir.clone();
    // The worker reports errors as strings so the result stays Send.
    let render = tokio::task::spawn_blocking(move || {
        pdf::write_list_document(&fonts_dir, &header, &consolidated, created_at, &output_path)
            .map_err(|err| err.to_string())
    })
    .await;

    match render {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(
                "document write failed for {} (recipes {:?}): {}",
                username, recipe_ids, err
            );
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Internal server error"}));
        }
        Err(err) => {
            error!(
                "document render task failed for {} (recipes {:?}): {}",
                username, recipe_ids, err
            );
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Internal server error"}));
        }
    }

    let url = format!("/shopping-lists/{}", filename);
    let record = ShoppingListRecord {
        id: record_id,
        username: username.clone(),
        created_at,
        recipe_ids: recipe_ids.clone(),
        list_file_url: url.clone(),
        notes: String::new(),
    };
    if let Err(err) = store.append_record(record).await {
        error!(
            "record append failed for {} (recipes {:?}): {}",
            username, recipe_ids, err
        );
        return HttpResponse::InternalServerError().json(json!({"error": "Internal server error"}));
    }

    info!("generated shopping list {} for {}", url, username);
    HttpResponse::Ok().json(json!({ "url": url }))
}

/// Pulls `recipeIds` out of the raw request body. `None` means the request
/// is malformed (missing field, not an array, or empty). Elements that are
/// not strings are skipped; they can never match a stored recipe anyway.
fn parse_recipe_ids(payload: &Value) -> Option<Vec<String>> {
    let ids = payload.get("recipeIds")?.as_array()?;
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// Requester identity from the `X-Username` header, with the anonymous
/// placeholder when the header is missing or blank.
fn requester(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Username")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

/// Makes a requester name safe for use in a document filename: German
/// umlauts are transliterated, whitespace runs become a single underscore,
/// everything else outside `[A-Za-z0-9._-]` is removed.
fn sanitize_filename(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        match ch {
            'ä' => sanitized.push_str("ae"),
            'ö' => sanitized.push_str("oe"),
            'ü' => sanitized.push_str("ue"),
            'Ä' => sanitized.push_str("Ae"),
            'Ö' => sanitized.push_str("Oe"),
            'Ü' => sanitized.push_str("Ue"),
            'ß' => sanitized.push_str("ss"),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => sanitized.push(c),
            _ => {}
        }
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_ids_require_a_non_empty_array() {
        assert!(parse_recipe_ids(&json!({})).is_none());
        assert!(parse_recipe_ids(&json!({"recipeIds": "r1"})).is_none());
        assert!(parse_recipe_ids(&json!({"recipeIds": []})).is_none());
        assert_eq!(
            parse_recipe_ids(&json!({"recipeIds": ["r1", "r2"]})),
            Some(vec!["r1".to_string(), "r2".to_string()])
        );
    }

    #[test]
    fn non_string_ids_are_skipped() {
        assert_eq!(
            parse_recipe_ids(&json!({"recipeIds": ["r1", 7, null]})),
            Some(vec!["r1".to_string()])
        );
    }

    #[test]
    fn filenames_transliterate_umlauts_and_collapse_whitespace() {
        assert_eq!(sanitize_filename("Jürgen Müßig"), "Juergen_Muessig");
        assert_eq!(sanitize_filename("a  b\tc"), "a_b_c");
        assert_eq!(sanitize_filename("weird/..\\name!"), "weird..name");
    }
}
