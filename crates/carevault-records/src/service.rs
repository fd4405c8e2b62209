//! Patient record service: scope admission, row-level visibility,
//! and audit orchestration around the patient store.

use carevault_core::authz::{self, Actor, ScopeRequirement};
use carevault_core::error::{CoreError, CoreResult};
use carevault_core::models::audit::{AuditAction, AuditOutcome, CreateAuditEntry};
use carevault_core::models::patient::{CreatePatient, Patient};
use carevault_core::repository::{AuditLogRepository, Pagination, PatientRepository};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

/// Resource type recorded on patient audit entries.
const PATIENT_RESOURCE: &str = "Patient";

/// Access policy knobs for the patient service.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    /// Also record audit entries for denied attempts. Off by
    /// default: only permitted operations are audited.
    pub audit_denials: bool,
}

/// Patient record service.
///
/// Every operation runs the same sequence: scope admission, the
/// guarded action under the actor's visibility filter, then a
/// synchronous audit append. An operation whose audit entry cannot
/// be persisted fails even if the action itself succeeded.
///
/// Generic over the repository implementations so that this layer
/// has no dependency on the database crate.
pub struct PatientService<P: PatientRepository, A: AuditLogRepository> {
    patients: P,
    audit: A,
    policy: AccessPolicy,
}

impl<P: PatientRepository, A: AuditLogRepository> PatientService<P, A> {
    pub fn new(patients: P, audit: A, policy: AccessPolicy) -> Self {
        Self {
            patients,
            audit,
            policy,
        }
    }

    /// List patients visible to the actor, oldest first, optionally
    /// filtered by a case-insensitive name search.
    pub async fn list(
        &self,
        actor: &Actor,
        search: Option<&str>,
        pagination: Pagination,
    ) -> CoreResult<Vec<Patient>> {
        // 1. Scope admission.
        self.admit(actor, &authz::PATIENT_READ, AuditAction::Read, None)
            .await?;

        // 2. Query through the actor's visibility filter.
        let visibility = authz::patient_visibility(actor.role, actor.id);
        let patients = self.patients.list(&visibility, search, pagination).await?;

        // 3. Record the read before returning it.
        self.record(CreateAuditEntry {
            actor_id: actor.id,
            action: AuditAction::Read,
            resource_type: PATIENT_RESOURCE.into(),
            resource_id: None,
            outcome: AuditOutcome::Success,
            details: Some(json!({
                "search": search,
                "skip": pagination.offset,
                "limit": pagination.limit,
            })),
        })
        .await?;

        Ok(patients)
    }

    /// Fetch a single patient by id.
    ///
    /// A patient hidden by the visibility filter is reported exactly
    /// like a missing one.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> CoreResult<Patient> {
        // 1. Scope admission.
        self.admit(actor, &authz::PATIENT_READ, AuditAction::Read, Some(id))
            .await?;

        // 2. Fetch, then apply the visibility filter.
        let patient = self.patients.get_by_id(id).await?;

        let visibility = authz::patient_visibility(actor.role, actor.id);
        if !visibility.admits(&patient) {
            self.record_denial(actor, AuditAction::Read, Some(id)).await;
            return Err(CoreError::RowNotVisible {
                entity: "patient".into(),
            });
        }

        // 3. Record the read before returning it.
        self.record(CreateAuditEntry {
            actor_id: actor.id,
            action: AuditAction::Read,
            resource_type: PATIENT_RESOURCE.into(),
            resource_id: Some(id),
            outcome: AuditOutcome::Success,
            details: None,
        })
        .await?;

        Ok(patient)
    }

    /// Create a patient record. The insert and its audit entry
    /// commit in one transaction.
    pub async fn create(&self, actor: &Actor, input: CreatePatient) -> CoreResult<Patient> {
        // 1. Scope admission.
        self.admit(actor, &authz::PATIENT_CREATE, AuditAction::Create, None)
            .await?;

        // 2. Role-level creation gate.
        if !authz::creation_allowed(actor.role) {
            self.record_denial(actor, AuditAction::Create, None).await;
            return Err(CoreError::InsufficientScope {
                reason: "role may not create patient records".into(),
            });
        }

        // 3. Insert and audit atomically; the repository fills in the
        //    assigned patient id as resource_id.
        let audit = CreateAuditEntry {
            actor_id: actor.id,
            action: AuditAction::Create,
            resource_type: PATIENT_RESOURCE.into(),
            resource_id: None,
            outcome: AuditOutcome::Success,
            details: None,
        };

        self.patients.create_audited(input, audit).await
    }

    /// Scope admission shared by every operation.
    async fn admit(
        &self,
        actor: &Actor,
        required: &ScopeRequirement,
        action: AuditAction,
        resource_id: Option<Uuid>,
    ) -> CoreResult<()> {
        match authz::authorize(required, &actor.scopes) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.record_denial(actor, action, resource_id).await;
                Err(e)
            }
        }
    }

    /// Append a success audit entry; a failed write aborts the
    /// operation.
    async fn record(&self, entry: CreateAuditEntry) -> CoreResult<()> {
        match self.audit.append(entry).await {
            Ok(_) => Ok(()),
            Err(e) => Err(CoreError::AuditWriteFailed(e.to_string())),
        }
    }

    /// Append a denial audit entry when the policy asks for one.
    /// The denial is returned to the caller either way; a failed
    /// write here is logged, not propagated.
    async fn record_denial(&self, actor: &Actor, action: AuditAction, resource_id: Option<Uuid>) {
        if !self.policy.audit_denials {
            return;
        }

        let entry = CreateAuditEntry {
            actor_id: actor.id,
            action,
            resource_type: PATIENT_RESOURCE.into(),
            resource_id,
            outcome: AuditOutcome::Denied,
            details: None,
        };
        if let Err(e) = self.audit.append(entry).await {
            error!(error = %e, "Failed to record authorization denial");
        }
    }
}
