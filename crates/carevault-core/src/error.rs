//! Error types shared across the CareVault crates.

use thiserror::Error;

/// Top-level error type for CareVault operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {reason}")]
    TokenInvalid { reason: String },

    #[error("Insufficient scope: {reason}")]
    InsufficientScope { reason: String },

    /// The row exists but the actor's visibility filter excludes it.
    /// Surfaced to clients exactly like [`CoreError::NotFound`].
    #[error("Row not visible: {entity}")]
    RowNotVisible { entity: String },

    #[error("Audit write failed: {0}")]
    AuditWriteFailed(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),
}

/// Convenience result type using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
