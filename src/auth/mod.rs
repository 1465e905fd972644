pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;
pub mod token_validator;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

// Re-export necessary items
pub use extractors::AuthContext;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec, TokenError};
pub use token_validator::{JwtValidator, StubValidator, TokenValidator};

lazy_static! {
    // Letters, digits and `_ . @ -`, so email-style usernames are allowed.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.@-]+$").unwrap();
}

/// Payload for `POST /login`.
///
/// Clients may also send a `role`; it is ignored, the token carries the stored role.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for `POST /register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 64),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, '_', '.', '@' or '-'"
        )
    )]
    pub username: String,
    /// bcrypt only looks at the first 72 bytes, so longer input is refused.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
    /// Must be `technician` or `manager`; anything else fails deserialization.
    pub role: Role,
}

fn validate_password_bytes(password: &str) -> Result<(), validator::ValidationError> {
    if password.len() > 72 {
        return Err(validator::ValidationError::new("password_too_long"));
    }
    Ok(())
}

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
