//! Environment-driven server configuration.

use std::env;

use anyhow::{Context, Result};
use carevault_auth::AuthConfig;
use carevault_db::DbConfig;
use carevault_records::AccessPolicy;
use dotenvy::dotenv;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub policy: AccessPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development).
        let _ = dotenv();

        let auth = AuthConfig {
            signing_key: env::var("AUTH_SIGNING_KEY").context("AUTH_SIGNING_KEY must be set")?,
            previous_signing_keys: env::var("AUTH_PREVIOUS_SIGNING_KEYS")
                .map(|keys| {
                    keys.split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            access_token_lifetime_secs: env::var("AUTH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .context("AUTH_TOKEN_TTL_SECS must be a valid number")?,
            jwt_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "carevault".to_string()),
            pepper: env::var("AUTH_PEPPER").ok(),
        };

        let db = DbConfig {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            namespace: env::var("SURREALDB_NS").unwrap_or_else(|_| "carevault".to_string()),
            database: env::var("SURREALDB_DB").unwrap_or_else(|_| "main".to_string()),
            username: env::var("SURREALDB_USER").unwrap_or_else(|_| "root".to_string()),
            password: env::var("SURREALDB_PASS").unwrap_or_else(|_| "root".to_string()),
        };

        let policy = AccessPolicy {
            audit_denials: env::var("AUDIT_DENIALS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            db,
            auth,
            policy,
        })
    }
}
