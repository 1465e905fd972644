use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::store::TaskStore;

/// Health check
///
/// Reports the process and each dependency it checks. 503 with
/// `"status": "unhealthy"` while the task store is unreachable.
#[get("/health")]
pub async fn health(tasks: web::Data<dyn TaskStore>) -> impl Responder {
    let database = match tasks.ping().await {
        Ok(()) => "healthy",
        Err(err) => {
            log::warn!("health check failed: {}", err);
            "unhealthy"
        }
    };

    let body = json!({
        "status": if database == "healthy" { "ok" } else { "unhealthy" },
        "timestamp": Utc::now(),
        "checks": { "database": database }
    });
    if database == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Liveness probe. Never touches the store.
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "alive" }))
}

/// Readiness probe
///
/// Round-trips to the task store; 503 while it is unreachable.
#[get("/health/ready")]
pub async fn readiness(tasks: web::Data<dyn TaskStore>) -> impl Responder {
    match tasks.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ready",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            log::warn!("readiness check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
