use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// The only algorithm tokens are signed and verified with.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The authenticated user's id. Always >= 1 in a valid token.
    pub user_id: i64,
    /// The user's role at login time, e.g. `"technician"`.
    pub role: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch. Strictly greater than `iat`.
    pub exp: i64,
}

/// Why a token was rejected, or why issuing one failed.
///
/// The distinction only ever reaches the logs; callers of the HTTP API see a single
/// generic "invalid token".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("token issued in the future")]
    NotYetValid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::WrongAlgorithm,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        }
    }
}

/// Issues and verifies signed, time-bounded identity tokens.
///
/// Built once at startup from the shared secret and then only read, so a single
/// instance is shared across all workers behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec signing with HS256 under `secret`.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Generates a token for `user_id` acting as `role`, valid from now for 24 hours.
    ///
    /// # Returns
    /// The encoded token, or `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims with the pinned algorithm. `issue` is the normal entry point.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies `token` and decodes its claims.
    ///
    /// Checks, in order: structure and header, that the header names exactly HS256, the
    /// signature, expiry (zero leeway), then that `iat` is not in the future and the
    /// claims themselves are well formed. Claims are only returned when every check passes.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.iat > Utc::now().timestamp() {
            return Err(TokenError::NotYetValid);
        }
        if claims.user_id < 1 || claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}
