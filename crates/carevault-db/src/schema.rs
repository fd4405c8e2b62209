//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs and dates of birth are stored as strings; enums are stored
//! as strings with ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

/// Tracks applied migrations. Created outside the migration list so
/// the runner can bootstrap itself.
const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (clinical staff accounts)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD full_name ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'doctor', 'nurse', 'researcher'];
DEFINE FIELD department ON TABLE user TYPE option<string>;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Patients
-- =======================================================================
DEFINE TABLE patient SCHEMAFULL;
DEFINE FIELD fiscal_code ON TABLE patient TYPE string;
DEFINE FIELD first_name ON TABLE patient TYPE string;
DEFINE FIELD last_name ON TABLE patient TYPE string;
DEFINE FIELD date_of_birth ON TABLE patient TYPE string;
DEFINE FIELD gender ON TABLE patient TYPE string \
    ASSERT $value IN ['male', 'female', 'other'];
DEFINE FIELD phone ON TABLE patient TYPE option<string>;
DEFINE FIELD email ON TABLE patient TYPE option<string>;
DEFINE FIELD address ON TABLE patient TYPE option<string>;
DEFINE FIELD emergency_contact ON TABLE patient TYPE option<string>;
DEFINE FIELD blood_type ON TABLE patient TYPE option<string>;
DEFINE FIELD height_cm ON TABLE patient TYPE option<float>;
DEFINE FIELD weight_kg ON TABLE patient TYPE option<float>;
DEFINE FIELD allergies ON TABLE patient TYPE option<string>;
DEFINE FIELD smoking ON TABLE patient TYPE bool DEFAULT false;
DEFINE FIELD alcohol_consumption ON TABLE patient TYPE bool \
    DEFAULT false;
DEFINE FIELD physical_activity_level ON TABLE patient \
    TYPE option<string>;
DEFINE FIELD primary_doctor_id ON TABLE patient TYPE option<string>;
DEFINE FIELD last_visit_date ON TABLE patient TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE patient TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE patient TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_patient_fiscal_code ON TABLE patient \
    COLUMNS fiscal_code UNIQUE;
DEFINE INDEX idx_patient_primary_doctor ON TABLE patient \
    COLUMNS primary_doctor_id;

-- =======================================================================
-- Audit Log (append-only; no update or delete permitted)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD actor_id ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string \
    ASSERT $value IN ['CREATE', 'READ', 'UPDATE', 'DELETE'];
DEFINE FIELD resource_type ON TABLE audit_log TYPE string;
DEFINE FIELD resource_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD outcome ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Success', 'Denied'];
DEFINE FIELD details ON TABLE audit_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_timestamp ON TABLE audit_log COLUMNS timestamp;
DEFINE INDEX idx_audit_actor ON TABLE audit_log COLUMNS actor_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
