//! Domain models for the CareVault system.

pub mod audit;
pub mod patient;
pub mod user;
