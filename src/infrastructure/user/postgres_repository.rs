//! PostgreSQL user repository implementation

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{Password, PasswordHasher, User, UserId, UserRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UserRepository
///
/// Expects a `users` table with an identity `id`, a unique `email` and an
/// `encrypted_password` column.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    hasher: Arc<dyn PasswordHasher>,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { pool, hasher }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, mut user: User) -> Result<User, DomainError> {
        user.prepare_for_persistence(self.hasher.as_ref())?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, encrypted_password) VALUES ($1, $2) RETURNING id",
        )
        .bind(user.email())
        .bind(user.password().encrypted())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.email(), "create"))?;

        user.set_id(UserId::new(id));

        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, DomainError> {
        user.prepare_for_persistence(self.hasher.as_ref())?;

        let result = sqlx::query(
            "UPDATE users SET email = $2, encrypted_password = $3 WHERE id = $1",
        )
        .bind(user.id().value())
        .bind(user.email())
        .bind(user.password().encrypted())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.email(), "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User {} not found", user.id())));
        }

        Ok(user)
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, DomainError> {
        let row = sqlx::query("SELECT id, email, encrypted_password FROM users WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User {} not found", id))),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        let row = sqlx::query("SELECT id, email, encrypted_password FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", email))),
        }
    }

    async fn all_users(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query("SELECT id, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::with_capacity(rows.len());

        for row in rows {
            let id: i64 = row.try_get("id").map_err(column_error)?;
            let email: String = row.try_get("email").map_err(column_error)?;
            users.push(User::from_parts(UserId::new(id), email, Password::default()));
        }

        Ok(users)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.try_get("id").map_err(column_error)?;
    let email: String = row.try_get("email").map_err(column_error)?;
    let encrypted: String = row.try_get("encrypted_password").map_err(column_error)?;

    Ok(User::from_parts(
        UserId::new(id),
        email,
        Password::from_encrypted(encrypted),
    ))
}

fn column_error(e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("Invalid user row: {}", e))
}

fn map_write_error(e: sqlx::Error, email: &str, action: &str) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::duplicate(format!("email: '{}' is already taken", email))
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, e))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
