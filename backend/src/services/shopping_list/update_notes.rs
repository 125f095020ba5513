use crate::store::{Store, StoreError};
use actix_web::{web, HttpResponse, Responder};
use common::requests::UpdateNotesRequest;
use log::error;
use serde_json::json;

/// Actix web handler for `PUT /api/shoppingLists/{list_id}`.
///
/// Replaces the record's `notes` with the body's `notes` field and returns
/// the updated record. Generation records are immutable apart from their
/// notes, so everything else the body may carry is ignored.
///
/// # Returns
/// - `200 OK` with the updated record.
/// - `404 Not Found` for an unknown id.
/// - `500 Internal Server Error` when rewriting the collection fails.
pub(crate) async fn process(
    list_id: web::Path<String>,
    payload: web::Json<UpdateNotesRequest>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.update_notes(list_id.as_str(), &payload.notes).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(json!({"error": "Shopping list not found"}))
        }
        Err(err) => {
            error!("failed to update notes for {}: {}", list_id.as_str(), err);
            HttpResponse::InternalServerError().json(json!({"error": "Internal server error"}))
        }
    }
}
