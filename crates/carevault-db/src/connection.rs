//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".to_string(),
            namespace: "carevault".to_string(),
            database: "main".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
        }
    }
}

/// Manages the SurrealDB connection lifecycle.
pub struct DbManager {
    client: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB over WebSocket, authenticate, and select
    /// the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %config.url, "Connecting to SurrealDB");

        let client = Surreal::new::<Ws>(&config.url).await?;

        client
            .signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            namespace = %config.namespace,
            database = %config.database,
            "SurrealDB connection established"
        );

        Ok(Self { client })
    }

    /// Access to the underlying client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.client
    }
}
