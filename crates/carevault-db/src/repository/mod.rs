//! SurrealDB repository implementations.

mod audit;
mod patient;
mod user;

pub use audit::SurrealAuditLogRepository;
pub use patient::SurrealPatientRepository;
pub use user::SurrealUserRepository;
