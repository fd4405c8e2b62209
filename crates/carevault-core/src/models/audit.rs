//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Read => "READ",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<AuditAction> {
        match s {
            "CREATE" => Some(AuditAction::Create),
            "READ" => Some(AuditAction::Read),
            "UPDATE" => Some(AuditAction::Update),
            "DELETE" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

/// Whether the audited operation was allowed through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditOutcome {
    Success,
    Denied,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "Success",
            AuditOutcome::Denied => "Denied",
        }
    }

    pub fn parse(s: &str) -> Option<AuditOutcome> {
        match s {
            "Success" => Some(AuditOutcome::Success),
            "Denied" => Some(AuditOutcome::Denied),
            _ => None,
        }
    }
}

/// One immutable audit trail entry. Entries are only ever appended;
/// there is no update or delete path anywhere in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub outcome: AuditOutcome,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    pub outcome: AuditOutcome,
    /// Free-form context; stored as an empty object when absent.
    pub details: Option<serde_json::Value>,
}
