use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthContext;
use crate::auth::token_validator::TokenValidator;
use crate::error::AppError;

/// Rejects any request without a valid `Authorization: Bearer <token>` header and
/// attaches the caller's `AuthContext` to the ones it lets through.
///
/// Wrap it around the scopes that need authentication; public routes are simply
/// mounted outside of it.
pub struct AuthMiddleware {
    validator: Arc<dyn TokenValidator>,
}

impl AuthMiddleware {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            validator: self.validator.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    validator: Arc<dyn TokenValidator>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(req.headers(), self.validator.as_ref()) {
            Ok(ctx) => {
                req.extensions_mut().insert(ctx);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let res = req
                    .into_response(app_err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

/// Runs the header checks and token validation for one request.
///
/// 1. The `Authorization` header must be present and non-empty.
/// 2. It must be exactly `Bearer <token>`: two segments separated by a single space.
/// 3. The validator must accept the token. The reason for a rejection is logged, never
///    returned.
pub fn authenticate(
    headers: &HeaderMap,
    validator: &dyn TokenValidator,
) -> Result<AuthContext, AppError> {
    let value = match headers.get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AppError::Unauthorized("authorization required".into())),
    };

    let token = value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("invalid token format".into()))?;

    match validator.validate_token(token) {
        Ok(claims) => Ok(AuthContext::from(claims)),
        Err(reason) => {
            log::warn!("rejected bearer token: {}", reason);
            Err(AppError::Unauthorized("invalid token".into()))
        }
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let segments: Vec<&str> = value.split(' ').collect();
    match segments.as_slice() {
        ["Bearer", token] if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::{Claims, TokenCodec, TokenError};
    use crate::auth::token_validator::{JwtValidator, StubValidator};
    use crate::models::Role;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::{http::StatusCode, web, App, HttpResponse};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    async fn whoami(ctx: AuthContext) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "user_id": ctx.user_id, "role": ctx.role }))
    }

    fn technician_claims() -> Claims {
        Claims {
            user_id: 1,
            role: "technician".to_string(),
            iat: 0,
            exp: 1,
        }
    }

    /// Sends a GET to a protected `/protected` route and returns status plus JSON body.
    async fn send(validator: Arc<dyn TokenValidator>, auth: Option<&str>) -> (StatusCode, Value) {
        let app = init_service(
            App::new().service(
                web::scope("/protected")
                    .wrap(AuthMiddleware::new(validator))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let mut req = TestRequest::get().uri("/protected");
        if let Some(auth) = auth {
            req = req.insert_header((header::AUTHORIZATION, auth));
        }
        let resp = call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = read_body_json(resp).await;
        (status, body)
    }

    #[actix_rt::test]
    async fn test_missing_header_is_rejected() {
        let stub = Arc::new(StubValidator::accepting(technician_claims()));
        let (status, body) = send(stub.clone(), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authorization required");
        assert_eq!(stub.calls(), 0);
    }

    #[actix_rt::test]
    async fn test_empty_header_is_treated_as_missing() {
        let stub = Arc::new(StubValidator::accepting(technician_claims()));
        let (status, body) = send(stub.clone(), Some("")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authorization required");
    }

    #[actix_rt::test]
    async fn test_malformed_header_never_reaches_validator() {
        for header_value in [
            "Bearer",
            "Bearer ",
            "tokenonly",
            "Bearer a b",
            "Bearer  token",
            "Basic dXNlcjpwdw==",
            "bearer token",
        ] {
            let stub = Arc::new(StubValidator::accepting(technician_claims()));
            let (status, body) = send(stub.clone(), Some(header_value)).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header_value);
            assert_eq!(body["error"], "invalid token format", "header {:?}", header_value);
            assert_eq!(stub.calls(), 0, "header {:?}", header_value);
        }
    }

    #[actix_rt::test]
    async fn test_validator_rejection_is_generic() {
        for reason in [
            TokenError::Expired,
            TokenError::SignatureMismatch,
            TokenError::WrongAlgorithm,
            TokenError::Malformed,
            TokenError::NotYetValid,
        ] {
            let stub = Arc::new(StubValidator::rejecting(reason));
            let (status, body) = send(stub.clone(), Some("Bearer sometoken")).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "invalid token");
            assert_eq!(stub.calls(), 1);
            assert_eq!(stub.last_token().as_deref(), Some("sometoken"));
        }
    }

    #[actix_rt::test]
    async fn test_accepted_token_attaches_context() {
        let stub = Arc::new(StubValidator::accepting(technician_claims()));
        let (status, body) = send(stub, Some("Bearer sometoken")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user_id": 1, "role": "technician" }));
    }

    #[actix_rt::test]
    async fn test_with_real_codec() {
        let codec = Arc::new(TokenCodec::new("middleware_secret"));
        let token = codec.issue(7, Role::Manager).unwrap();
        let validator: Arc<dyn TokenValidator> = Arc::new(JwtValidator::new(codec));

        let (status, body) = send(validator.clone(), Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["role"], "manager");

        let (status, _) = send(validator, Some(&format!("Bearer {}x", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token("Token abc"), None);
    }
}
