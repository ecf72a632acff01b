//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("email: cannot be blank")]
    EmptyEmail,

    #[error("email: must be a valid email address")]
    InvalidEmail,

    #[error("password: cannot be blank")]
    PasswordRequired,

    #[error("password: the length must be between {0} and {max}", max = MAX_PASSWORD_LENGTH)]
    PasswordTooShort(usize),

    #[error("password: the length must be between {min} and {0}", min = MIN_PASSWORD_LENGTH)]
    PasswordTooLong(usize),
}

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 36;

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Must be a well-formed address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a plaintext password
///
/// Rules:
/// - Required when no hash has been stored yet
/// - When present, between 8 and 36 characters
pub fn validate_password(original: &str, has_hash: bool) -> Result<(), UserValidationError> {
    if original.is_empty() {
        return if has_hash {
            Ok(())
        } else {
            Err(UserValidationError::PasswordRequired)
        };
    }

    let length = original.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
