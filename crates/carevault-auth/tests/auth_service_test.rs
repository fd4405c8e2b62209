//! Integration tests for the authentication service backed by an
//! in-memory SurrealDB instance.

use carevault_auth::{AuthConfig, AuthService, LoginInput, password};
use carevault_core::error::CoreError;
use carevault_core::models::user::{CreateUser, Role};
use carevault_core::repository::UserRepository;
use carevault_db::repository::SurrealUserRepository;
use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        signing_key: "integration-test-signing-key!!!!".to_string(),
        ..AuthConfig::default()
    }
}

/// Spin up an in-memory database, run migrations, and create one
/// active doctor account.
async fn setup() -> (Surreal<Db>, AuthService<SurrealUserRepository<Db>>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carevault_db::run_migrations(&db).await.unwrap();

    let repo = SurrealUserRepository::new(db.clone());
    repo.create(CreateUser {
        username: "testdoctor".to_string(),
        email: "doctor@example.com".to_string(),
        password_hash: password::hash_password("testpass123", None).unwrap(),
        full_name: "Test Doctor".to_string(),
        role: Role::Doctor,
        department: Some("Geriatrics".to_string()),
    })
    .await
    .unwrap();

    let service = AuthService::new(SurrealUserRepository::new(db.clone()), test_auth_config());
    (db, service)
}

fn login_input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_issues_role_scoped_token() {
    let (_db, service) = setup().await;
    let now = Utc::now();

    let output = service
        .login(login_input("testdoctor", "testpass123"), now)
        .await
        .unwrap();

    assert_eq!(output.token_type, "bearer");
    assert_eq!(output.expires_in, 1800);

    let actor = service.authenticate(&output.access_token, now).await.unwrap();
    assert_eq!(actor.username, "testdoctor");
    assert_eq!(actor.role, Role::Doctor);
    assert_eq!(actor.scopes, vec!["doctor".to_string()]);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_alike() {
    let (_db, service) = setup().await;
    let now = Utc::now();

    let wrong_password = service
        .login(login_input("testdoctor", "not-the-password"), now)
        .await
        .unwrap_err();
    let unknown_user = service
        .login(login_input("ghost", "testpass123"), now)
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, CoreError::InvalidCredentials));
    assert!(matches!(unknown_user, CoreError::InvalidCredentials));
}

#[tokio::test]
async fn username_lookup_is_case_sensitive() {
    let (_db, service) = setup().await;

    let err = service
        .login(login_input("TestDoctor", "testpass123"), Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidCredentials));
}

#[tokio::test]
async fn deactivated_account_cannot_login() {
    let (db, service) = setup().await;
    let repo = SurrealUserRepository::new(db.clone());

    let user = repo.get_by_username("testdoctor").await.unwrap();
    repo.deactivate(user.id).await.unwrap();

    let err = service
        .login(login_input("testdoctor", "testpass123"), Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidCredentials));
}

#[tokio::test]
async fn token_stops_working_after_deactivation() {
    let (db, service) = setup().await;
    let now = Utc::now();

    let output = service
        .login(login_input("testdoctor", "testpass123"), now)
        .await
        .unwrap();

    let repo = SurrealUserRepository::new(db.clone());
    let user = repo.get_by_username("testdoctor").await.unwrap();
    repo.deactivate(user.id).await.unwrap();

    let err = service
        .authenticate(&output.access_token, now)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TokenInvalid { .. }));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (_db, service) = setup().await;
    let issued = Utc::now();

    let output = service
        .login(login_input("testdoctor", "testpass123"), issued)
        .await
        .unwrap();

    let after_expiry = issued + Duration::minutes(31);
    let err = service
        .authenticate(&output.access_token, after_expiry)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::TokenInvalid { .. }));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let (_db, service) = setup().await;
    let now = Utc::now();

    let output = service
        .login(login_input("testdoctor", "testpass123"), now)
        .await
        .unwrap();

    // Flip the last character of the signature.
    let mut tampered = output.access_token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let err = service.authenticate(&tampered, now).await.unwrap_err();
    assert!(matches!(err, CoreError::TokenInvalid { .. }));
}
