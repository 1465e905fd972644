//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a request can hit is collapsed into one of a handful of variants, each
//! mapped to a single HTTP status and a JSON body of the form `{"error": "..."}`.
//!
//! Store and signing failures are logged in full but reach the client only as a generic
//! message. Token validation failures arrive here already collapsed to one
//! `Unauthorized("invalid token")`, so the caller cannot tell an expired token from a
//! forged one.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or rejected credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed or over-limit input (HTTP 400).
    BadRequest(String),
    /// Authenticated, but the role or ownership check failed (HTTP 403).
    Forbidden(String),
    /// The resource is absent, or a conditional write matched no rows (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure, e.g. token signing or password hashing (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the backing store (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.as_str(),
            // Never leak driver or crypto detail to the client.
            AppError::InternalServerError(detail) => {
                log::error!("internal error: {}", detail);
                "internal server error"
            }
            AppError::DatabaseError(detail) => {
                log::error!("store error: {}", detail);
                "internal server error"
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique-constraint violations become `BadRequest` (duplicate username on registration),
/// `RowNotFound` becomes `NotFound`, and everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BadRequest("Username already registered".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::BadRequest`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::BadRequest(error.to_string())
    }
}

/// Collapses every verification failure into one generic `Unauthorized`.
/// Only a signing failure, which happens on issue, is an internal error.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(detail) => {
                AppError::InternalServerError(format!("Failed to sign token: {}", detail))
            }
            _ => AppError::Unauthorized("invalid token".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Forbidden("Only technicians can create tasks".into());
        assert_eq!(error.error_response().status(), 403);

        let error = AppError::NotFound("Task not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::DatabaseError("connection refused".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_store_detail_is_not_leaked() {
        let error = AppError::DatabaseError("relation \"tasks\" does not exist".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "internal server error");
    }

    #[test]
    fn test_token_errors_collapse_to_one_message() {
        for err in [
            TokenError::Malformed,
            TokenError::SignatureMismatch,
            TokenError::WrongAlgorithm,
            TokenError::Expired,
            TokenError::NotYetValid,
        ] {
            match AppError::from(err) {
                AppError::Unauthorized(msg) => assert_eq!(msg, "invalid token"),
                other => panic!("unexpected mapping: {:?}", other),
            }
        }

        assert!(matches!(
            AppError::from(TokenError::Signing("boom".into())),
            AppError::InternalServerError(_)
        ));
    }
}
