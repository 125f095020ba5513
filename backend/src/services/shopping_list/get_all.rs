use crate::store::Store;
use actix_web::{web, HttpResponse, Responder};

/// Actix web handler for `GET /api/shoppingLists`.
///
/// Returns every generation record; filtering by username is the caller's
/// concern, not enforced here.
pub(crate) async fn process(store: web::Data<Store>) -> impl Responder {
    HttpResponse::Ok().json(store.list_records().await)
}
