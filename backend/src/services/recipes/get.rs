use crate::store::Store;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// Actix web handler for `GET /api/recipes/{recipe_id}`.
pub(crate) async fn process(
    recipe_id: web::Path<String>,
    store: web::Data<Store>,
) -> impl Responder {
    match store.raw_recipe(recipe_id.as_str()).await {
        Some(recipe) => HttpResponse::Ok().json(recipe),
        None => HttpResponse::NotFound().json(json!({"error": "Recipe not found"})),
    }
}
