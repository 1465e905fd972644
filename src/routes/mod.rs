pub mod auth;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthMiddleware, TokenValidator};
use crate::error::AppError;

/// Mounts every route. `/tasks` is wrapped by `AuthMiddleware` backed by `validator`;
/// registration, login and health stay public.
///
/// Expects `web::Data<dyn UserStore>`, `web::Data<dyn TaskStore>` and
/// `web::Data<TokenCodec>` to be registered on the `App`.
pub fn config(validator: Arc<dyn TokenValidator>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid request body: {}", err)).into()
        }))
        .service(health::health)
        .service(health::liveness)
        .service(health::readiness)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(validator))
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
    }
}
