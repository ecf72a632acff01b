//! User domain
//!
//! This module provides the user entity, its validation rules, and the
//! storage and password hashing ports that infrastructure implements.

mod entity;
mod password;
mod repository;
mod validation;

pub use entity::{Password, User, UserId};
pub use password::PasswordHasher;
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_password, UserValidationError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
