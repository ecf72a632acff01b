//! Domain layer - Core entities, rules and storage ports

pub mod error;
pub mod user;

pub use error::DomainError;
pub use user::{Password, PasswordHasher, User, UserId, UserRepository};
