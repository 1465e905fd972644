use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::Role;

/// The authenticated identity attached to one in-flight request.
///
/// `AuthMiddleware` inserts it into the request extensions after a token validates;
/// handlers receive it by value as an extractor. It is rebuilt from the token on every
/// request and never shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    /// Role exactly as carried by the token.
    pub role: String,
}

impl AuthContext {
    /// The role if it is one this service knows. Unknown roles pass authentication
    /// but fail every role-gated policy check.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

impl FromRequest for AuthContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(ctx) => ready(Ok(ctx)),
            // Only reachable if a protected handler is mounted outside the middleware.
            None => ready(Err(
                AppError::Unauthorized("authorization required".to_string()).into(),
            )),
        }
    }
}
