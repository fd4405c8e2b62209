//! CareVault Auth — password hashing, JWT access tokens, and the
//! login/authentication service.
//!
//! The service is generic over the user repository trait, so this
//! crate carries no database dependency.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::AccessTokenClaims;
