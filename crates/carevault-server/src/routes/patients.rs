//! Patient endpoints.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use carevault_core::authz::Actor;
use carevault_core::error::CoreError;
use carevault_core::models::patient::{CreatePatient, Patient};
use carevault_core::repository::Pagination;
use chrono::Utc;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on page size; larger requests are clamped.
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

/// GET /patients — visibility-filtered patient listing.
pub async fn list_patients<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let pagination = Pagination {
        offset: params.skip,
        limit: params.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
    };

    let patients = state
        .patients
        .list(&actor, params.search.as_deref(), pagination)
        .await?;

    Ok(Json(patients))
}

/// GET /patients/:id — fetch a single patient.
pub async fn get_patient<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state.patients.get(&actor, id).await?;
    Ok(Json(patient))
}

/// POST /patients — create a patient record.
pub async fn create_patient<C: Connection>(
    State(state): State<AppState<C>>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreatePatient>,
) -> Result<Json<Patient>, ApiError> {
    if input.date_of_birth > Utc::now().date_naive() {
        return Err(ApiError(CoreError::Validation {
            message: "date_of_birth cannot be in the future".to_string(),
        }));
    }

    let patient = state.patients.create(&actor, input).await?;
    Ok(Json(patient))
}
