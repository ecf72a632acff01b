//! Apiserver
//!
//! A small JSON API with:
//! - User sign-up and sign-in
//! - Signed session cookies guarding the `/authorized` routes
//! - PostgreSQL or in-memory user storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use rand::RngCore;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::config::{SessionConfig, StorageBackend, StorageConfig};
use crate::domain::{PasswordHasher, UserRepository};
use crate::infrastructure::session::CookieSessionStore;
use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository};

/// User storage opened at startup
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pool: Option<PgPool>,
}

impl Storage {
    /// Open the configured backend. PostgreSQL is connected and pinged here so
    /// an unreachable database aborts startup.
    pub async fn open(config: &StorageConfig, hasher: Arc<dyn PasswordHasher>) -> anyhow::Result<Self> {
        info!("Storage backend: {:?}", config.backend);

        match config.backend {
            StorageBackend::Memory => Ok(Self {
                users: Arc::new(InMemoryUserRepository::new(hasher)),
                pool: None,
            }),
            StorageBackend::Postgres => {
                let pool = connect_database(config).await?;
                Ok(Self {
                    users: Arc::new(PostgresUserRepository::new(pool.clone(), hasher)),
                    pool: Some(pool),
                })
            }
        }
    }

    /// Release the connection pool, if any
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            info!("PostgreSQL connection pool closed");
        }
    }
}

/// Connect to PostgreSQL and verify the connection with a ping
pub async fn connect_database(config: &StorageConfig) -> anyhow::Result<PgPool> {
    let database_url = config.resolve_database_url().ok_or_else(|| {
        anyhow::anyhow!("storage.database_url or DATABASE_URL is required for the postgres backend")
    })?;

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ping PostgreSQL: {}", e))?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

/// Build the signed-cookie session store, generating a key when none is configured
pub fn create_session_store(config: &SessionConfig) -> CookieSessionStore {
    let key = if config.key.is_empty() {
        warn!("No session key configured; generated a random one, sessions will not survive a restart");
        generate_session_key()
    } else {
        config.key.as_bytes().to_vec()
    };

    CookieSessionStore::new(key).with_secure(config.secure)
}

fn generate_session_key() -> Vec<u8> {
    let mut key = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

/// Create the application state with custom configuration
pub fn create_app_state(
    config: &AppConfig,
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
) -> AppState {
    let sessions = Arc::new(create_session_store(&config.session));

    AppState::new(users, hasher, sessions, config.session.cookie_name.as_str())
}

/// Default password hasher
pub fn create_password_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_session_keys_differ() {
        let first = generate_session_key();
        let second = generate_session_key();

        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_open_memory_storage() {
        let storage = Storage::open(&StorageConfig::default(), create_password_hasher())
            .await
            .unwrap();

        assert!(storage.users.all_users().await.unwrap().is_empty());
        storage.close().await;
    }

    #[tokio::test]
    async fn test_postgres_without_url_fails() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            database_url: Some(String::new()),
            ..StorageConfig::default()
        };

        // Only meaningful when DATABASE_URL is unset in the test environment
        if std::env::var("DATABASE_URL").is_err() {
            assert!(connect_database(&config).await.is_err());
        }
    }

    #[test]
    fn test_create_app_state_uses_cookie_name() {
        let mut config = AppConfig::default();
        config.session.cookie_name = "custom_session".to_string();
        let hasher = create_password_hasher();
        let users = Arc::new(InMemoryUserRepository::new(hasher.clone()));

        let state = create_app_state(&config, users, hasher);

        assert_eq!(&*state.session_name, "custom_session");
    }
}
