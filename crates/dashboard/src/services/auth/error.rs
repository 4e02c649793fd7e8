//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-up and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] converty_core::EmailError),

    /// Wrong password or unknown email.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered.
    #[error("An account with this email already exists")]
    UserAlreadyExists,

    /// Password too short.
    #[error("{0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Missing or unusable shop name.
    #[error("{0}")]
    InvalidShopName(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the message is safe and useful to show on the form.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
