//! CareVault Records — the patient record service.
//!
//! Wraps the patient store with scope admission, row-level
//! visibility, and synchronous audit recording.

pub mod service;

pub use service::{AccessPolicy, PatientService};
