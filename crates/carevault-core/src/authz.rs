//! Authorization rules: scope admission, row-level patient
//! visibility, and creation gating.
//!
//! Every protected operation passes through two gates. The scope gate
//! compares the scopes carried by the actor's token against the
//! operation's requirement. The visibility gate then filters which
//! patient rows the actor may see at all.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::patient::Patient;
use crate::models::user::Role;

/// The authenticated principal attached to a request after token
/// verification.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    /// Scopes carried by the presented token.
    pub scopes: Vec<String>,
}

/// Scopes a protected operation demands.
#[derive(Debug, Clone, Copy)]
pub enum ScopeRequirement {
    /// Every listed scope must be granted.
    All(&'static [&'static str]),
    /// At least one of the listed scopes must be granted.
    Any(&'static [&'static str]),
}

/// Listing and reading patient records.
pub const PATIENT_READ: ScopeRequirement = ScopeRequirement::Any(&["admin", "doctor", "nurse"]);

/// Creating patient records.
pub const PATIENT_CREATE: ScopeRequirement = ScopeRequirement::Any(&["admin", "doctor"]);

impl ScopeRequirement {
    /// Whether the granted scopes satisfy this requirement. Order and
    /// duplicates on either side do not matter.
    pub fn admits(&self, granted: &[String]) -> bool {
        match self {
            ScopeRequirement::All(required) => {
                required.iter().all(|req| granted.iter().any(|g| g == req))
            }
            ScopeRequirement::Any(accepted) => {
                accepted.iter().any(|acc| granted.iter().any(|g| g == acc))
            }
        }
    }
}

/// Admit or reject a set of granted scopes against a requirement.
pub fn authorize(required: &ScopeRequirement, granted: &[String]) -> CoreResult<()> {
    if required.admits(granted) {
        Ok(())
    } else {
        Err(CoreError::InsufficientScope {
            reason: "required scope not granted".into(),
        })
    }
}

/// Row-level visibility filter over patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientVisibility {
    /// Every patient row is visible.
    All,
    /// Only patients whose `primary_doctor_id` matches.
    PrimaryDoctor(Uuid),
    /// No patient row is visible.
    Denied,
}

/// Resolve the visibility filter for an actor.
///
/// Roles without an explicit grant here see nothing.
pub fn patient_visibility(role: Role, user_id: Uuid) -> PatientVisibility {
    match role {
        Role::Admin | Role::Nurse => PatientVisibility::All,
        Role::Doctor => PatientVisibility::PrimaryDoctor(user_id),
        _ => PatientVisibility::Denied,
    }
}

impl PatientVisibility {
    /// Whether a single patient row passes this filter.
    pub fn admits(&self, patient: &Patient) -> bool {
        match self {
            PatientVisibility::All => true,
            PatientVisibility::PrimaryDoctor(doctor_id) => {
                patient.primary_doctor_id == Some(*doctor_id)
            }
            PatientVisibility::Denied => false,
        }
    }
}

/// Whether a role may create patient records.
pub fn creation_allowed(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Doctor)
}
