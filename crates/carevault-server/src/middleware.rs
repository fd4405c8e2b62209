//! Bearer-token authentication middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use carevault_core::error::CoreError;
use chrono::Utc;
use surrealdb::Connection;

use crate::error::ApiError;
use crate::state::AppState;

/// Verify the bearer token and attach the authenticated actor to the
/// request extensions. Requests without a valid token are rejected.
pub async fn require_auth<C: Connection>(
    State(state): State<AppState<C>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(ApiError(CoreError::TokenInvalid {
        reason: "missing bearer token".to_string(),
    }))?;

    let actor = state.auth.authenticate(token, Utc::now()).await?;
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Extract the token from the Authorization header (handles both
/// "Bearer <token>" and a raw token).
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let auth_header = request.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    Some(auth_str.strip_prefix("Bearer ").unwrap_or(auth_str))
}
