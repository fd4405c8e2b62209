//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical role assigned to a user account.
///
/// Exactly one role per account, fixed at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Researcher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Researcher => "researcher",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "doctor" => Some(Role::Doctor),
            "nurse" => Some(Role::Nurse),
            "researcher" => Some(Role::Researcher),
            _ => None,
        }
    }
}

/// Scopes granted when a token is issued for a role.
///
/// Roles map to scopes through this table rather than by reusing the
/// role name directly, so the two can diverge without touching the
/// token format. Today each role grants the single scope named after
/// it.
pub fn role_scopes(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &["admin"],
        Role::Doctor => &["doctor"],
        Role::Nurse => &["nurse"],
        Role::Researcher => &["researcher"],
    }
}

/// A clinical staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id digest in PHC string format. Plaintext passwords are
    /// never stored.
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Precomputed Argon2id digest, never the raw password.
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub department: Option<String>,
}
