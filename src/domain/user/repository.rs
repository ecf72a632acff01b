//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
///
/// Implementations hash pending plaintext passwords on `create` and `update`
/// and never hand a plaintext back from a read.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Persist a new user and assign its id
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace a stored user, re-hashing when a new plaintext is attached
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Remove a user. Removing an unknown id is not an error.
    async fn delete(&self, id: UserId) -> Result<(), DomainError>;

    /// Get a user by id
    async fn find_by_id(&self, id: UserId) -> Result<User, DomainError>;

    /// Get a user by email (for login)
    async fn find_by_email(&self, email: &str) -> Result<User, DomainError>;

    /// List ids and emails of all users, ordered by id
    async fn all_users(&self) -> Result<Vec<User>, DomainError>;
}
