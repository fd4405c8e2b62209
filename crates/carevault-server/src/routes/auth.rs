//! Authentication endpoints.

use axum::Json;
use axum::extract::{Form, State};
use carevault_auth::LoginInput;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::error::ApiError;
use crate::state::AppState;

/// OAuth2 password-grant style form body. Extra form fields such as
/// `grant_type` are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// POST /auth/token — exchange username and password for a bearer
/// token.
pub async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let output = state
        .auth
        .login(
            LoginInput {
                username: form.username,
                password: form.password,
            },
            Utc::now(),
        )
        .await?;

    Ok(Json(TokenResponse {
        access_token: output.access_token,
        token_type: output.token_type,
        expires_in: output.expires_in,
    }))
}
