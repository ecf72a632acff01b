//! Infrastructure layer - storage, sessions and logging

pub mod logging;
pub mod session;
pub mod user;
