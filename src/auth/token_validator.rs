use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::token::{Claims, TokenCodec, TokenError};

/// Anything that can turn a bearer token into trusted claims.
///
/// `AuthMiddleware` only depends on this trait, so it can be exercised with a
/// `StubValidator` instead of real key material.
pub trait TokenValidator: Send + Sync {
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError>;
}

/// Production validator: verifies with the shared `TokenCodec`.
#[derive(Clone)]
pub struct JwtValidator {
    codec: Arc<TokenCodec>,
}

impl JwtValidator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl TokenValidator for JwtValidator {
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.codec.verify(token)
    }
}

/// Validator returning a fixed, programmed result for every token.
///
/// Records how often it was consulted and the last token it saw.
pub struct StubValidator {
    result: Result<Claims, TokenError>,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl StubValidator {
    /// Accepts every token, yielding `claims`.
    pub fn accepting(claims: Claims) -> Self {
        Self::with_result(Ok(claims))
    }

    /// Rejects every token with `error`.
    pub fn rejecting(error: TokenError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<Claims, TokenError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
        }
    }

    /// Number of times `validate_token` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl TokenValidator for StubValidator {
    fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_token.lock() {
            *last = Some(token.to_string());
        }
        self.result.clone()
    }
}
