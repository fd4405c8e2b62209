//! Patient domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    pub fn parse(s: &str) -> Option<BloodType> {
        match s {
            "A+" => Some(BloodType::APositive),
            "A-" => Some(BloodType::ANegative),
            "B+" => Some(BloodType::BPositive),
            "B-" => Some(BloodType::BNegative),
            "AB+" => Some(BloodType::AbPositive),
            "AB-" => Some(BloodType::AbNegative),
            "O+" => Some(BloodType::OPositive),
            "O-" => Some(BloodType::ONegative),
            _ => None,
        }
    }
}

/// An elderly-care patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    /// National fiscal code, unique per patient.
    pub fiscal_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<BloodType>,
    /// Height in centimeters.
    pub height_cm: Option<f64>,
    /// Weight in kilograms.
    pub weight_kg: Option<f64>,
    pub allergies: Option<String>,
    pub smoking: bool,
    pub alcohol_consumption: bool,
    pub physical_activity_level: Option<String>,
    /// Weak reference to the assigned doctor's user id. Patient rows
    /// outlive doctor accounts, so this is never a cascading link.
    pub primary_doctor_id: Option<Uuid>,
    pub last_visit_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatient {
    pub fiscal_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<BloodType>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub allergies: Option<String>,
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol_consumption: bool,
    pub physical_activity_level: Option<String>,
    pub primary_doctor_id: Option<Uuid>,
    pub last_visit_date: Option<DateTime<Utc>>,
}
