//! HTTP error mapping.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use carevault_core::error::CoreError;
use serde_json::json;
use tracing::error;

/// Error wrapper implementing the HTTP mapping for [`CoreError`].
///
/// Response bodies are generic on purpose: authentication failures
/// never reveal whether the username or the password was wrong, and
/// a patient hidden by the visibility filter produces a response
/// byte-identical to a missing one.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            CoreError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Incorrect username or password".to_string(),
            ),
            CoreError::TokenInvalid { .. } => (
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ),
            CoreError::InsufficientScope { .. } => {
                (StatusCode::FORBIDDEN, "Not enough permissions".to_string())
            }
            CoreError::NotFound { entity, .. } | CoreError::RowNotVisible { entity } => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            CoreError::Validation { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            CoreError::AuditWriteFailed(_) | CoreError::Database(_) | CoreError::Crypto(_) => {
                error!(error = %self.0, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "detail": detail }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
