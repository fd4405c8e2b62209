//! CareVault Core — shared domain models, error taxonomy,
//! authorization rules, and repository trait definitions.
//!
//! This crate has no I/O of its own: the database crate implements
//! the repository traits defined here, and the auth and records
//! crates build their services on top of them.

pub mod authz;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{CoreError, CoreResult};
