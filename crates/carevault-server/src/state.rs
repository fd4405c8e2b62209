//! Shared application state.

use std::sync::Arc;

use carevault_auth::{AuthConfig, AuthService};
use carevault_db::repository::{
    SurrealAuditLogRepository, SurrealPatientRepository, SurrealUserRepository,
};
use carevault_records::{AccessPolicy, PatientService};
use surrealdb::{Connection, Surreal};

/// Service handles shared across request handlers.
///
/// Generic over the SurrealDB engine so tests can run against the
/// in-memory engine.
pub struct AppState<C: Connection> {
    pub auth: Arc<AuthService<SurrealUserRepository<C>>>,
    pub patients: Arc<PatientService<SurrealPatientRepository<C>, SurrealAuditLogRepository<C>>>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            patients: Arc::clone(&self.patients),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth_config: AuthConfig, policy: AccessPolicy) -> Self {
        let auth = AuthService::new(SurrealUserRepository::new(db.clone()), auth_config);
        let patients = PatientService::new(
            SurrealPatientRepository::new(db.clone()),
            SurrealAuditLogRepository::new(db),
            policy,
        );

        Self {
            auth: Arc::new(auth),
            patients: Arc::new(patients),
        }
    }
}
