//! Provision one demo account per role for local development.
//!
//! Passwords come from SEED_<ROLE>_PASSWORD environment variables,
//! falling back to "<username>-password". Existing accounts are left
//! untouched.

use std::env;

use anyhow::{Context, Result};
use carevault_auth::password;
use carevault_core::error::CoreError;
use carevault_core::models::user::{CreateUser, Role};
use carevault_core::repository::UserRepository;
use carevault_db::DbManager;
use carevault_db::repository::SurrealUserRepository;
use carevault_server::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let manager = DbManager::connect(&config.db)
        .await
        .context("Failed to connect to SurrealDB")?;
    carevault_db::run_migrations(manager.client())
        .await
        .context("Failed to run migrations")?;

    let repo = SurrealUserRepository::new(manager.client().clone());

    let accounts = [
        (Role::Admin, "admin", "Admin User", None),
        (Role::Doctor, "doctor", "Demo Doctor", Some("Geriatrics")),
        (Role::Nurse, "nurse", "Demo Nurse", Some("Geriatrics")),
        (Role::Researcher, "researcher", "Demo Researcher", None),
    ];

    for (role, username, full_name, department) in accounts {
        match repo.get_by_username(username).await {
            Ok(_) => {
                println!("User '{username}' already exists, skipping");
                continue;
            }
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let password_var = format!("SEED_{}_PASSWORD", role.as_str().to_uppercase());
        let password_text =
            env::var(&password_var).unwrap_or_else(|_| format!("{username}-password"));
        let password_hash = password::hash_password(&password_text, config.auth.pepper.as_deref())
            .context("Failed to hash password")?;

        let user = repo
            .create(CreateUser {
                username: username.to_string(),
                email: format!("{username}@carevault.local"),
                password_hash,
                full_name: full_name.to_string(),
                role,
                department: department.map(String::from),
            })
            .await?;

        println!("Created {} user '{}' ({})", role.as_str(), user.username, user.id);
    }

    Ok(())
}
