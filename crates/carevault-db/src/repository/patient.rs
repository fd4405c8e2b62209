//! SurrealDB implementation of [`PatientRepository`].
//!
//! Row-level visibility is applied inside the list query itself, so
//! rows a doctor may not see never leave the database. The audited
//! create runs the patient insert and the audit append inside one
//! transaction.

use carevault_core::authz::PatientVisibility;
use carevault_core::error::CoreResult;
use carevault_core::models::audit::CreateAuditEntry;
use carevault_core::models::patient::{BloodType, CreatePatient, Gender, Patient};
use carevault_core::repository::{Pagination, PatientRepository};
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// SET clause shared by the plain and the audited create.
const PATIENT_SET: &str = "\
fiscal_code = $fiscal_code, \
first_name = $first_name, last_name = $last_name, \
date_of_birth = $date_of_birth, gender = $gender, \
phone = $phone, email = $email, address = $address, \
emergency_contact = $emergency_contact, \
blood_type = $blood_type, \
height_cm = $height_cm, weight_kg = $weight_kg, \
allergies = $allergies, smoking = $smoking, \
alcohol_consumption = $alcohol_consumption, \
physical_activity_level = $physical_activity_level, \
primary_doctor_id = $primary_doctor_id, \
last_visit_date = $last_visit_date";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PatientRow {
    fiscal_code: String,
    first_name: String,
    last_name: String,
    date_of_birth: String,
    gender: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    blood_type: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    allergies: Option<String>,
    smoking: bool,
    alcohol_consumption: bool,
    physical_activity_level: Option<String>,
    primary_doctor_id: Option<String>,
    last_visit_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PatientRowWithId {
    record_id: String,
    fiscal_code: String,
    first_name: String,
    last_name: String,
    date_of_birth: String,
    gender: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    blood_type: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    allergies: Option<String>,
    smoking: bool,
    alcohol_consumption: bool,
    physical_activity_level: Option<String>,
    primary_doctor_id: Option<String>,
    last_visit_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_gender(s: &str) -> Result<Gender, DbError> {
    Gender::parse(s).ok_or_else(|| DbError::Query(format!("unknown gender: {s}")))
}

fn parse_blood_type(s: &str) -> Result<BloodType, DbError> {
    BloodType::parse(s).ok_or_else(|| DbError::Query(format!("unknown blood type: {s}")))
}

fn parse_date_of_birth(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::Query(format!("invalid date of birth: {e}")))
}

fn parse_doctor_id(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Query(format!("invalid doctor UUID: {e}")))
}

impl PatientRow {
    fn into_patient(self, id: Uuid) -> Result<Patient, DbError> {
        Ok(Patient {
            id,
            fiscal_code: self.fiscal_code,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: parse_date_of_birth(&self.date_of_birth)?,
            gender: parse_gender(&self.gender)?,
            phone: self.phone,
            email: self.email,
            address: self.address,
            emergency_contact: self.emergency_contact,
            blood_type: self.blood_type.as_deref().map(parse_blood_type).transpose()?,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            allergies: self.allergies,
            smoking: self.smoking,
            alcohol_consumption: self.alcohol_consumption,
            physical_activity_level: self.physical_activity_level,
            primary_doctor_id: self.primary_doctor_id.as_deref().map(parse_doctor_id).transpose()?,
            last_visit_date: self.last_visit_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PatientRowWithId {
    fn try_into_patient(self) -> Result<Patient, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        Ok(Patient {
            id,
            fiscal_code: self.fiscal_code,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: parse_date_of_birth(&self.date_of_birth)?,
            gender: parse_gender(&self.gender)?,
            phone: self.phone,
            email: self.email,
            address: self.address,
            emergency_contact: self.emergency_contact,
            blood_type: self.blood_type.as_deref().map(parse_blood_type).transpose()?,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            allergies: self.allergies,
            smoking: self.smoking,
            alcohol_consumption: self.alcohol_consumption,
            physical_activity_level: self.physical_activity_level,
            primary_doctor_id: self.primary_doctor_id.as_deref().map(parse_doctor_id).transpose()?,
            last_visit_date: self.last_visit_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the patient repository.
#[derive(Clone)]
pub struct SurrealPatientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPatientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PatientRepository for SurrealPatientRepository<C> {
    async fn create(&self, input: CreatePatient) -> CoreResult<Patient> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let query = format!("CREATE type::record('patient', $id) SET {PATIENT_SET}");
        let result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("fiscal_code", input.fiscal_code))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("date_of_birth", input.date_of_birth.format("%Y-%m-%d").to_string()))
            .bind(("gender", input.gender.as_str().to_string()))
            .bind(("phone", input.phone))
            .bind(("email", input.email))
            .bind(("address", input.address))
            .bind(("emergency_contact", input.emergency_contact))
            .bind(("blood_type", input.blood_type.map(|bt| bt.as_str().to_string())))
            .bind(("height_cm", input.height_cm))
            .bind(("weight_kg", input.weight_kg))
            .bind(("allergies", input.allergies))
            .bind(("smoking", input.smoking))
            .bind(("alcohol_consumption", input.alcohol_consumption))
            .bind(("physical_activity_level", input.physical_activity_level))
            .bind(("primary_doctor_id", input.primary_doctor_id.map(|u| u.to_string())))
            .bind(("last_visit_date", input.last_visit_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "patient".into(),
            id: id_str,
        })?;

        Ok(row.into_patient(id)?)
    }

    async fn create_audited(
        &self,
        input: CreatePatient,
        audit: CreateAuditEntry,
    ) -> CoreResult<Patient> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let audit_id = Uuid::new_v4().to_string();

        let details = audit
            .details
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let query = format!(
            "BEGIN TRANSACTION; \
             CREATE type::record('patient', $id) SET {PATIENT_SET}; \
             CREATE type::record('audit_log', $audit_id) SET \
             actor_id = $actor_id, action = $action, \
             resource_type = $resource_type, resource_id = $id, \
             outcome = $outcome, details = $details; \
             COMMIT TRANSACTION;"
        );

        let result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("fiscal_code", input.fiscal_code))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("date_of_birth", input.date_of_birth.format("%Y-%m-%d").to_string()))
            .bind(("gender", input.gender.as_str().to_string()))
            .bind(("phone", input.phone))
            .bind(("email", input.email))
            .bind(("address", input.address))
            .bind(("emergency_contact", input.emergency_contact))
            .bind(("blood_type", input.blood_type.map(|bt| bt.as_str().to_string())))
            .bind(("height_cm", input.height_cm))
            .bind(("weight_kg", input.weight_kg))
            .bind(("allergies", input.allergies))
            .bind(("smoking", input.smoking))
            .bind(("alcohol_consumption", input.alcohol_consumption))
            .bind(("physical_activity_level", input.physical_activity_level))
            .bind(("primary_doctor_id", input.primary_doctor_id.map(|u| u.to_string())))
            .bind(("last_visit_date", input.last_visit_date))
            .bind(("audit_id", audit_id))
            .bind(("actor_id", audit.actor_id.to_string()))
            .bind(("action", audit.action.as_str().to_string()))
            .bind(("resource_type", audit.resource_type))
            .bind(("outcome", audit.outcome.as_str().to_string()))
            .bind(("details", details))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| DbError::Query(e.to_string()))?;

        // Read the row back after commit rather than relying on
        // statement result indexes inside the transaction.
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Patient> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('patient', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "patient".into(),
            id: id_str,
        })?;

        Ok(row.into_patient(id)?)
    }

    async fn list(
        &self,
        visibility: &PatientVisibility,
        search: Option<&str>,
        pagination: Pagination,
    ) -> CoreResult<Vec<Patient>> {
        let mut conditions: Vec<&str> = Vec::new();

        let doctor_id = match visibility {
            PatientVisibility::All => None,
            PatientVisibility::PrimaryDoctor(doctor_id) => {
                conditions.push("primary_doctor_id = $doctor_id");
                Some(doctor_id.to_string())
            }
            // Nothing is visible; skip the query entirely.
            PatientVisibility::Denied => return Ok(Vec::new()),
        };

        let search_term = search.map(|s| s.to_lowercase());
        if search_term.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(first_name), $search) \
                 OR string::contains(string::lowercase(last_name), $search))",
            );
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM patient {where_clause}\
             ORDER BY created_at ASC LIMIT $limit START $offset"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(doctor_id) = doctor_id {
            builder = builder.bind(("doctor_id", doctor_id));
        }
        if let Some(search_term) = search_term {
            builder = builder.bind(("search", search_term));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<PatientRowWithId> = result.take(0).map_err(DbError::from)?;

        let patients = rows
            .into_iter()
            .map(|row| row.try_into_patient())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(patients)
    }
}
