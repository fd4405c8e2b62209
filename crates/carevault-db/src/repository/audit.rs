//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The audit_log table permits create and select only; the schema
//! denies update and delete.

use carevault_core::error::CoreResult;
use carevault_core::models::audit::{AuditAction, AuditEntry, AuditOutcome, CreateAuditEntry};
use carevault_core::repository::AuditLogRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRow {
    actor_id: String,
    action: String,
    resource_type: String,
    resource_id: Option<String>,
    outcome: String,
    details: serde_json::Value,
    timestamp: DateTime<Utc>,
}

fn parse_action(s: &str) -> Result<AuditAction, DbError> {
    AuditAction::parse(s).ok_or_else(|| DbError::Query(format!("unknown audit action: {s}")))
}

fn parse_outcome(s: &str) -> Result<AuditOutcome, DbError> {
    AuditOutcome::parse(s).ok_or_else(|| DbError::Query(format!("unknown audit outcome: {s}")))
}

impl AuditRow {
    fn into_entry(self, id: Uuid) -> Result<AuditEntry, DbError> {
        let actor_id = Uuid::parse_str(&self.actor_id)
            .map_err(|e| DbError::Query(format!("invalid actor UUID: {e}")))?;
        let resource_id = self
            .resource_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| DbError::Query(format!("invalid resource UUID: {e}")))?;
        Ok(AuditEntry {
            id,
            actor_id,
            action: parse_action(&self.action)?,
            resource_type: self.resource_type,
            resource_id,
            outcome: parse_outcome(&self.outcome)?,
            details: self.details,
            timestamp: self.timestamp,
        })
    }
}

/// SurrealDB implementation of the append-only audit log.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditEntry) -> CoreResult<AuditEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let details = input
            .details
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 actor_id = $actor_id, action = $action, \
                 resource_type = $resource_type, \
                 resource_id = $resource_id, \
                 outcome = $outcome, details = $details",
            )
            .bind(("id", id_str.clone()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("action", input.action.as_str().to_string()))
            .bind(("resource_type", input.resource_type))
            .bind(("resource_id", input.resource_id.map(|u| u.to_string())))
            .bind(("outcome", input.outcome.as_str().to_string()))
            .bind(("details", details))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }
}
