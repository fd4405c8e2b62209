//! Authentication configuration.

/// Configuration for password hashing and token issuance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign newly issued tokens (HS256).
    pub signing_key: String,
    /// Previous signing secrets still accepted during key rotation.
    /// Verification falls back to these after the current key;
    /// issuance never uses them.
    pub previous_signing_keys: Vec<String>,
    /// Access token lifetime in seconds.
    pub access_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before hashing and
    /// verification.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            previous_signing_keys: Vec::new(),
            access_token_lifetime_secs: 1800,
            jwt_issuer: "carevault".to_string(),
            pepper: None,
        }
    }
}
