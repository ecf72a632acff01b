//! User infrastructure module
//!
//! This module provides implementations for user storage and password
//! hashing: Argon2 hashing, an in-memory repository and a PostgreSQL one.

mod password;
mod postgres_repository;
mod repository;

pub use password::Argon2Hasher;
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
