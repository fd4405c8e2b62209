//! JWT access token issuance and verification (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — the username.
    pub sub: String,
    /// Scopes granted to the subject's role at issuance.
    pub scopes: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID).
    pub jti: String,
}

/// Issue a signed access token.
///
/// The current instant is passed in rather than read from the system
/// clock, so issuance is deterministic under test.
pub fn issue_access_token(
    subject: &str,
    scopes: &[String],
    now: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let issued_at = now.timestamp();
    let claims = AccessTokenClaims {
        sub: subject.to_string(),
        scopes: scopes.to_vec(),
        iss: config.jwt_issuer.clone(),
        iat: issued_at,
        exp: issued_at + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.signing_key.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode error: {e}")))
}

/// Decode and verify an access token against the current signing key,
/// falling back to previous keys during rotation.
///
/// Expiry is checked against the supplied instant: a token is valid
/// strictly before its `exp` and rejected at or after it.
pub fn decode_access_token(
    token: &str,
    now: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
    // Expiry is compared against the injected instant below, not the
    // system clock.
    validation.validate_exp = false;

    let mut last_err = AuthError::TokenInvalid("signature verification failed".to_string());
    for secret in std::iter::once(&config.signing_key).chain(config.previous_signing_keys.iter()) {
        let key = DecodingKey::from_secret(secret.as_bytes());
        match jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation) {
            Ok(data) => {
                if data.claims.exp <= now.timestamp() {
                    return Err(AuthError::TokenExpired);
                }
                return Ok(data.claims);
            }
            Err(e) => last_err = AuthError::TokenInvalid(e.to_string()),
        }
    }

    Err(last_err)
}
