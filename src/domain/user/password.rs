//! Password hashing port

use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash. Malformed hashes never verify.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
