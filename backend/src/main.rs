use actix_web::{web, App, HttpResponse, HttpServer};
use backend::config::AppConfig;
use backend::services;
use backend::store::Store;
use env_logger::Env;
use log::info;
use std::fs;
use std::io;

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let store = Store::open(&config.database_file)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
    // The static mount below needs the directory to exist at startup.
    fs::create_dir_all(&config.lists_dir)?;

    let url = format!("http://{}:{}", config.host, config.port);
    info!("Server running at {}", url);
    info!("Collections loaded from {}", config.database_file);

    let bind_address = (config.host.clone(), config.port);
    let lists_dir = config.lists_dir.clone();
    let shared_config = web::Data::new(config);
    let shared_store = web::Data::new(store);
    let http_client = web::Data::new(reqwest::Client::new());

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024)) // 1 MB
            .app_data(shared_config.clone())
            .app_data(shared_store.clone())
            .app_data(http_client.clone())
            .route("/api/health", web::get().to(health))
            .service(services::recipes::configure_routes())
            .service(services::shopping_list::configure_routes())
            .service(actix_files::Files::new("/shopping-lists", lists_dir.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
