use crate::store::Store;
use actix_web::{web, HttpResponse, Responder};

/// Actix web handler for `GET /api/recipes`: returns the stored recipe
/// records verbatim, extra fields included.
pub(crate) async fn process(store: web::Data<Store>) -> impl Responder {
    HttpResponse::Ok().json(store.raw_recipes().await)
}
