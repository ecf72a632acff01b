//! User entity and related types

use serde::{Deserialize, Serialize};

use super::password::PasswordHasher;
use super::validation::{validate_email, validate_password};
use crate::domain::DomainError;

/// User identifier assigned by the repository on create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Placeholder carried by users that have not been persisted yet
    pub const UNASSIGNED: UserId = UserId(0);

    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plaintext and hashed halves of a user's password
///
/// The plaintext only lives for the duration of a create, update or login
/// call. The hash is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Password {
    #[serde(skip_serializing_if = "String::is_empty")]
    original: String,
    #[serde(skip_serializing)]
    encrypted: String,
}

impl Password {
    pub fn from_original(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            encrypted: String::new(),
        }
    }

    pub fn from_encrypted(encrypted: impl Into<String>) -> Self {
        Self {
            original: String::new(),
            encrypted: encrypted.into(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn encrypted(&self) -> &str {
        &self.encrypted
    }

    /// True when no plaintext is attached
    pub fn is_sanitized(&self) -> bool {
        self.original.is_empty()
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    email: String,
    #[serde(skip_serializing_if = "Password::is_sanitized")]
    password: Password,
}

impl User {
    /// Create a not-yet-persisted user from sign-up input
    pub fn new(email: impl Into<String>, original_password: impl Into<String>) -> Self {
        Self {
            id: UserId::UNASSIGNED,
            email: email.into(),
            password: Password::from_original(original_password),
        }
    }

    /// Rebuild a user from stored fields
    pub fn from_parts(id: UserId, email: impl Into<String>, password: Password) -> Self {
        Self {
            id,
            email: email.into(),
            password,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    // Mutators

    pub fn set_id(&mut self, id: UserId) {
        self.id = id;
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Attach a new plaintext password; it is hashed on the next persist
    pub fn set_password(&mut self, original: impl Into<String>) {
        self.password.original = original.into();
    }

    /// Check email and password rules
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&self.password.original, !self.password.encrypted.is_empty())
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(())
    }

    /// Validate and hash a pending plaintext password
    ///
    /// The plaintext is left in place; callers strip it with [`User::sanitize`].
    pub fn prepare_for_persistence(&mut self, hasher: &dyn PasswordHasher) -> Result<(), DomainError> {
        self.validate()?;

        if !self.password.original.is_empty() {
            self.password.encrypted = hasher.hash(&self.password.original)?;
        }

        Ok(())
    }

    /// Strip the plaintext password
    pub fn sanitize(&mut self) {
        self.password.original.clear();
    }

    /// Owned variant of [`User::sanitize`] for response payloads
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Drop both password halves, leaving id and email
    pub fn without_password(mut self) -> Self {
        self.password = Password::default();
        self
    }

    /// Check a login candidate against the stored hash
    pub fn has_same_password(&self, candidate: &str, hasher: &dyn PasswordHasher) -> bool {
        hasher.verify(candidate, &self.password.encrypted)
    }
}
