//! Integration tests for the append-only audit log repository.

use carevault_core::models::audit::{AuditAction, AuditOutcome, CreateAuditEntry};
use carevault_core::repository::AuditLogRepository;
use carevault_db::repository::SurrealAuditLogRepository;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carevault_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn append_returns_persisted_entry() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let actor_id = Uuid::new_v4();
    let resource_id = Uuid::new_v4();

    let entry = repo
        .append(CreateAuditEntry {
            actor_id,
            action: AuditAction::Read,
            resource_type: "Patient".into(),
            resource_id: Some(resource_id),
            outcome: AuditOutcome::Success,
            details: Some(json!({ "search": "rossi", "skip": 0, "limit": 100 })),
        })
        .await
        .unwrap();

    assert_eq!(entry.actor_id, actor_id);
    assert_eq!(entry.action, AuditAction::Read);
    assert_eq!(entry.resource_type, "Patient");
    assert_eq!(entry.resource_id, Some(resource_id));
    assert_eq!(entry.outcome, AuditOutcome::Success);
    assert_eq!(entry.details["search"], "rossi");
    assert_eq!(entry.details["limit"], 100);
}

#[tokio::test]
async fn append_without_details_stores_empty_object() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);

    let entry = repo
        .append(CreateAuditEntry {
            actor_id: Uuid::new_v4(),
            action: AuditAction::Create,
            resource_type: "Patient".into(),
            resource_id: None,
            outcome: AuditOutcome::Denied,
            details: None,
        })
        .await
        .unwrap();

    assert_eq!(entry.outcome, AuditOutcome::Denied);
    assert!(entry.resource_id.is_none());
    assert_eq!(entry.details, json!({}));
}

#[tokio::test]
async fn entries_accumulate_in_order() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db.clone());
    let actor_id = Uuid::new_v4();

    for action in [AuditAction::Create, AuditAction::Read, AuditAction::Read] {
        repo.append(CreateAuditEntry {
            actor_id,
            action,
            resource_type: "Patient".into(),
            resource_id: None,
            outcome: AuditOutcome::Success,
            details: None,
        })
        .await
        .unwrap();
    }

    let mut result = db
        .query("SELECT * FROM audit_log ORDER BY timestamp ASC")
        .await
        .unwrap();
    let rows: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(rows.len(), 3);
}
