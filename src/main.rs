use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use maintenance_tracker::auth::{JwtValidator, TokenCodec, TokenValidator};
use maintenance_tracker::config::Config;
use maintenance_tracker::routes;
use maintenance_tracker::store::{PgStore, TaskStore, UserStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let store = Arc::new(PgStore::new(pool));
    store
        .migrate()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let users: Arc<dyn UserStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;
    let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
    let validator: Arc<dyn TokenValidator> = Arc::new(JwtValidator::new(codec.clone()));

    log::info!("Starting maintenance tracker at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(users.clone()))
            .app_data(web::Data::from(tasks.clone()))
            .app_data(web::Data::from(codec.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config(validator.clone()))
    })
    .shutdown_timeout(30)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
