//! Authentication service: login and request authentication.

use carevault_core::authz::Actor;
use carevault_core::error::{CoreError, CoreResult};
use carevault_core::models::user::role_scopes;
use carevault_core::repository::UserRepository;
use chrono::{DateTime, Utc};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always "bearer".
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the repository implementation so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Authenticate with username and password and issue an access
    /// token carrying the role's scopes.
    ///
    /// Every failure surfaces as [`CoreError::InvalidCredentials`]:
    /// unknown username, wrong password, and deactivated account are
    /// indistinguishable to the caller.
    pub async fn login(&self, input: LoginInput, now: DateTime<Utc>) -> CoreResult<LoginOutput> {
        // 1. Look up the user by exact username.
        let user = match self.user_repo.get_by_username(&input.username).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify the password against the stored digest.
        if !password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        ) {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Reject deactivated accounts.
        if !user.is_active {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 4. Issue the token.
        let scopes: Vec<String> = role_scopes(user.role)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let access_token = token::issue_access_token(&user.username, &scopes, now, &self.config)?;

        Ok(LoginOutput {
            access_token,
            token_type: "bearer",
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Authenticate a bearer token presented on a request: verify the
    /// token, load the subject, and produce the [`Actor`] carried
    /// through the authorization gate.
    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> CoreResult<Actor> {
        // 1. Verify signature, structure, issuer, and expiry.
        let claims = token::decode_access_token(token, now, &self.config)?;

        // 2. The subject must still exist and be active.
        let user = match self.user_repo.get_by_username(&claims.sub).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".to_string()).into());
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AuthError::TokenInvalid("subject is deactivated".to_string()).into());
        }

        Ok(Actor {
            id: user.id,
            username: user.username,
            role: user.role,
            scopes: claims.scopes,
        })
    }
}
