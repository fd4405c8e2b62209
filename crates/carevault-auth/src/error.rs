//! Authentication error types.

use carevault_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => CoreError::InvalidCredentials,
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => CoreError::TokenInvalid {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => CoreError::Crypto(msg),
        }
    }
}
