//! End-to-end tests for the HTTP surface, driving the router with
//! `tower::ServiceExt::oneshot` against an in-memory database.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use carevault_auth::{AuthConfig, password, token};
use carevault_core::models::user::{CreateUser, Role, role_scopes};
use carevault_core::repository::UserRepository;
use carevault_db::repository::SurrealUserRepository;
use carevault_records::AccessPolicy;
use carevault_server::routes;
use carevault_server::state::AppState;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use surrealdb_types::SurrealValue;
use tower::ServiceExt;
use uuid::Uuid;

const SIGNING_KEY: &str = "api-test-signing-key-0123456789!";

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        signing_key: SIGNING_KEY.to_string(),
        ..AuthConfig::default()
    }
}

async fn setup() -> (Surreal<Db>, Router) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carevault_db::run_migrations(&db).await.unwrap();

    let state = AppState::new(db.clone(), test_auth_config(), AccessPolicy::default());
    (db, routes::router(state))
}

async fn create_user(db: &Surreal<Db>, username: &str, password_text: &str, role: Role) -> Uuid {
    let repo = SurrealUserRepository::new(db.clone());
    let user = repo
        .create(CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: password::hash_password(password_text, None).unwrap(),
            full_name: format!("Test {username}"),
            role,
            department: None,
        })
        .await
        .unwrap();
    user.id
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_login(app: &Router, username: &str, password_text: &str) -> axum::response::Response {
    let body = format!("username={username}&password={password_text}");
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn login(app: &Router, username: &str, password_text: &str) -> String {
    let response = post_login(app, username, password_text).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

async fn get_with_token(app: &Router, uri: &str, token: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn post_patient(app: &Router, token: &str, payload: Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/patients")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn patient_payload(fiscal_code: &str, doctor: Option<Uuid>) -> Value {
    json!({
        "fiscal_code": fiscal_code,
        "first_name": "Anna",
        "last_name": "Bianchi",
        "date_of_birth": "1942-07-03",
        "gender": "female",
        "primary_doctor_id": doctor,
    })
}

#[derive(Debug, SurrealValue)]
struct AuditRow {
    actor_id: String,
    action: String,
    resource_id: Option<String>,
    outcome: String,
}

async fn audit_rows(db: &Surreal<Db>) -> Vec<AuditRow> {
    let mut result = db
        .query("SELECT * FROM audit_log ORDER BY timestamp ASC")
        .await
        .unwrap();
    result.take(0).unwrap()
}

async fn patient_count(db: &Surreal<Db>) -> usize {
    let mut result = db.query("SELECT * FROM patient").await.unwrap();
    let rows: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    rows.len()
}

#[tokio::test]
async fn health_is_public() {
    let (_db, app) = setup().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_returns_bearer_token() {
    let (db, app) = setup().await;
    create_user(&db, "doc1", "docpass123", Role::Doctor).await;

    let response = post_login(&app, "doc1", "docpass123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 1800);
    assert!(json["access_token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn login_failures_are_generic_and_identical() {
    let (db, app) = setup().await;
    create_user(&db, "doc1", "docpass123", Role::Doctor).await;

    let wrong_password = post_login(&app, "doc1", "wrong").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let wrong_password_body = read_json(wrong_password).await;

    let unknown_user = post_login(&app, "ghost", "docpass123").await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user_body = read_json(unknown_user).await;

    // The two failures are indistinguishable.
    assert_eq!(wrong_password_body, unknown_user_body);
    assert_eq!(wrong_password_body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn missing_or_garbage_token_is_rejected() {
    let (_db, app) = setup().await;

    let missing = app
        .clone()
        .oneshot(Request::builder().uri("/patients").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        missing.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let garbage = get_with_token(&app, "/patients", "not-a-jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(garbage).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (db, app) = setup().await;
    create_user(&db, "doc1", "docpass123", Role::Doctor).await;

    let issued = Utc::now() - Duration::minutes(31);
    let scopes: Vec<String> = role_scopes(Role::Doctor)
        .iter()
        .map(|s| s.to_string())
        .collect();
    let stale =
        token::issue_access_token("doc1", &scopes, issued, &test_auth_config()).unwrap();

    let response = get_with_token(&app, "/patients", &stale).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn doctor_lists_only_their_patients() {
    let (db, app) = setup().await;
    let doctor_id = create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    let other_doctor_id = create_user(&db, "doc2", "docpass456", Role::Doctor).await;

    let doc1_token = login(&app, "doc1", "docpass123").await;
    let doc2_token = login(&app, "doc2", "docpass456").await;

    // doc1 creates two patients assigned to themselves, doc2 one.
    for fiscal in ["FC001", "FC002"] {
        let response = post_patient(&app, &doc1_token, patient_payload(fiscal, Some(doctor_id))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response =
        post_patient(&app, &doc2_token, patient_payload("FC003", Some(other_doctor_id))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_token(&app, "/patients", &doc1_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patients = read_json(response).await;
    let patients = patients.as_array().unwrap();
    assert_eq!(patients.len(), 2);
    for patient in patients {
        assert_eq!(patient["primary_doctor_id"], doctor_id.to_string().as_str());
    }
}

#[tokio::test]
async fn admin_sees_all_patients() {
    let (db, app) = setup().await;
    let doctor_id = create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    create_user(&db, "boss", "adminpass1", Role::Admin).await;

    let doc_token = login(&app, "doc1", "docpass123").await;
    post_patient(&app, &doc_token, patient_payload("FC001", Some(doctor_id))).await;
    post_patient(&app, &doc_token, patient_payload("FC002", None)).await;

    let admin_token = login(&app, "boss", "adminpass1").await;
    let response = get_with_token(&app, "/patients", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patients = read_json(response).await;
    assert_eq!(patients.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn researcher_cannot_list_patients() {
    let (db, app) = setup().await;
    create_user(&db, "res1", "respass123", Role::Researcher).await;

    let token = login(&app, "res1", "respass123").await;
    let response = get_with_token(&app, "/patients", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["detail"], "Not enough permissions");
}

#[tokio::test]
async fn hidden_and_missing_patients_are_indistinguishable() {
    let (db, app) = setup().await;
    create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    let other_doctor = create_user(&db, "doc2", "docpass456", Role::Doctor).await;

    // A patient assigned to the other doctor.
    let doc2_token = login(&app, "doc2", "docpass456").await;
    let created = post_patient(&app, &doc2_token, patient_payload("FC001", Some(other_doctor))).await;
    let created = read_json(created).await;
    let hidden_id = created["id"].as_str().unwrap().to_string();

    let doc1_token = login(&app, "doc1", "docpass123").await;

    let hidden = get_with_token(&app, &format!("/patients/{hidden_id}"), &doc1_token).await;
    let hidden_status = hidden.status();
    let hidden_body = read_json(hidden).await;

    let missing = get_with_token(&app, &format!("/patients/{}", Uuid::new_v4()), &doc1_token).await;
    let missing_status = missing.status();
    let missing_body = read_json(missing).await;

    assert_eq!(hidden_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(hidden_body, missing_body);

    // The record is still there for its own doctor.
    let own = get_with_token(&app, &format!("/patients/{hidden_id}"), &doc2_token).await;
    assert_eq!(own.status(), StatusCode::OK);
}

#[tokio::test]
async fn doctor_create_writes_patient_and_audit_atomically() {
    let (db, app) = setup().await;
    let doctor_id = create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    let token = login(&app, "doc1", "docpass123").await;

    let response = post_patient(&app, &token, patient_payload("FC001", Some(doctor_id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patient = read_json(response).await;
    let patient_id = patient["id"].as_str().unwrap();

    let rows = audit_rows(&db).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, "CREATE");
    assert_eq!(rows[0].outcome, "Success");
    assert_eq!(rows[0].actor_id, doctor_id.to_string());
    assert_eq!(rows[0].resource_id.as_deref(), Some(patient_id));
}

#[tokio::test]
async fn nurse_create_is_denied_before_any_write() {
    let (db, app) = setup().await;
    create_user(&db, "nurse1", "nursepass1", Role::Nurse).await;
    let token = login(&app, "nurse1", "nursepass1").await;

    let response = post_patient(&app, &token, patient_payload("FC001", None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert_eq!(patient_count(&db).await, 0);
    assert!(audit_rows(&db).await.is_empty());
}

#[tokio::test]
async fn nurse_can_read_patients() {
    let (db, app) = setup().await;
    let doctor_id = create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    create_user(&db, "nurse1", "nursepass1", Role::Nurse).await;

    let doc_token = login(&app, "doc1", "docpass123").await;
    post_patient(&app, &doc_token, patient_payload("FC001", Some(doctor_id))).await;

    let nurse_token = login(&app, "nurse1", "nursepass1").await;
    let response = get_with_token(&app, "/patients", &nurse_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patients = read_json(response).await;
    assert_eq!(patients.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_reads_are_audited() {
    let (db, app) = setup().await;
    let doctor_id = create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    let token = login(&app, "doc1", "docpass123").await;

    let response = get_with_token(&app, "/patients?search=rossi&limit=10", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let rows = audit_rows(&db).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, "READ");
    assert_eq!(rows[0].outcome, "Success");
    assert_eq!(rows[0].actor_id, doctor_id.to_string());
}

#[tokio::test]
async fn future_date_of_birth_is_rejected() {
    let (db, app) = setup().await;
    create_user(&db, "doc1", "docpass123", Role::Doctor).await;
    let token = login(&app, "doc1", "docpass123").await;

    let future = (Utc::now() + Duration::days(2)).date_naive();
    let mut payload = patient_payload("FC001", None);
    payload["date_of_birth"] = json!(future.format("%Y-%m-%d").to_string());

    let response = post_patient(&app, &token, payload).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(patient_count(&db).await, 0);
}

#[tokio::test]
async fn list_pagination_applies() {
    let (db, app) = setup().await;
    create_user(&db, "boss", "adminpass1", Role::Admin).await;
    let token = login(&app, "boss", "adminpass1").await;

    for i in 0..3 {
        let response =
            post_patient(&app, &token, patient_payload(&format!("FC{i:03}"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_with_token(&app, "/patients?skip=2&limit=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patients = read_json(response).await;
    assert_eq!(patients.as_array().unwrap().len(), 1);
}
