//! Identity: registration, credential checks and user lookup.

mod password;
mod service;

pub use password::{hash_password, validate_password, verify_password};
pub use service::UserService;

use store::{StoreError, UserId};
use thiserror::Error;

/// Input for registering a user with credentials.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// The input failed a validation rule.
    #[error("{0}")]
    Validation(String),

    /// The email already belongs to a registered user.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Unknown email, inactive account or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No active user with this id.
    #[error("No user with id {0} found")]
    NotFound(UserId),

    /// Hashing or parsing a password hash failed.
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => UserError::DuplicateEmail(email),
            other => UserError::Store(other),
        }
    }
}

/// Result type for identity operations.
pub type UserResult<T> = Result<T, UserError>;
