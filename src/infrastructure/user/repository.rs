//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{PasswordHasher, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug)]
struct Inner {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
///
/// Ids are handed out sequentially from 1 and never reused. Email uniqueness
/// is not enforced here; the SQL store relies on its unique constraint.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
    hasher: Arc<dyn PasswordHasher>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: BTreeMap::new(),
                last_id: 0,
            }),
            hasher,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> Result<User, DomainError> {
        user.prepare_for_persistence(self.hasher.as_ref())?;

        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        user.set_id(UserId::new(inner.last_id));
        inner.users.insert(user.id(), user.clone().sanitized());

        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, DomainError> {
        // Unknown ids fail before any hashing
        if !self.inner.read().await.users.contains_key(&user.id()) {
            return Err(DomainError::not_found(format!("User {} not found", user.id())));
        }

        user.prepare_for_persistence(self.hasher.as_ref())?;

        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&user.id()) {
            Some(stored) => {
                *stored = user.clone().sanitized();
                Ok(user)
            }
            None => Err(DomainError::not_found(format!("User {} not found", user.id()))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        self.inner.write().await.users.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, DomainError> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User {} not found", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", email)))
    }

    async fn all_users(&self) -> Result<Vec<User>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .users
            .values()
            .map(|u| u.clone().without_password())
            .collect())
    }
}
