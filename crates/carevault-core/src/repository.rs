//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and return core errors.
//! Implementations live in the database crate; the auth and records
//! services depend only on these traits.

use uuid::Uuid;

use crate::authz::PatientVisibility;
use crate::error::CoreResult;
use crate::models::audit::{AuditEntry, CreateAuditEntry};
use crate::models::patient::{CreatePatient, Patient};
use crate::models::user::{CreateUser, User};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// User credential store.
pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<User>> + Send;

    /// Exact, case-sensitive username lookup.
    fn get_by_username(&self, username: &str) -> impl Future<Output = CoreResult<User>> + Send;

    /// Clear the active flag. Accounts are never deleted.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
}

/// Patient record store.
pub trait PatientRepository: Send + Sync {
    fn create(&self, input: CreatePatient) -> impl Future<Output = CoreResult<Patient>> + Send;

    /// Create a patient and append its audit entry in a single
    /// transaction: both commit or neither does. The entry's
    /// `resource_id` is set to the id assigned to the new patient,
    /// overriding whatever the caller passed.
    fn create_audited(
        &self,
        input: CreatePatient,
        audit: CreateAuditEntry,
    ) -> impl Future<Output = CoreResult<Patient>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Patient>> + Send;

    /// List patients passing the visibility filter, oldest first.
    /// `search` matches first or last name, case-insensitively.
    fn list(
        &self,
        visibility: &PatientVisibility,
        search: Option<&str>,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<Vec<Patient>>> + Send;
}

/// Append-only audit trail.
pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit entry. No update or delete operations
    /// exist.
    fn append(&self, input: CreateAuditEntry)
    -> impl Future<Output = CoreResult<AuditEntry>> + Send;
}
