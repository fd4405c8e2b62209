//! CareVault Server — HTTP surface over the authentication and
//! patient record services.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
