//! Authentication error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during authentication operations.
///
/// `UnknownEmail` and `WrongPassword` are distinct variants so the server can
/// log which case occurred, but the response layer collapses both into the
/// same generic unauthorized message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] storefront_core::EmailError),

    /// Invalid display name.
    #[error("{0}")]
    InvalidName(String),

    /// Login request without email or password.
    #[error("Please provide an email and password")]
    MissingCredentials,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// No account for the email. Surfaces as "Invalid credentials".
    #[error("no account for this email")]
    UnknownEmail,

    /// Password mismatch. Surfaces as "Invalid credentials".
    #[error("password mismatch")]
    WrongPassword,

    /// Registration against an already-registered email.
    #[error("This email address already exists")]
    UserAlreadyExists,

    /// No user for an id (admin operations).
    #[error("User not found")]
    UserNotFound,

    /// Request without a bearer token.
    #[error("Authentication invalid, no token provided")]
    TokenMissing,

    /// Bearer token failed verification, expired, or references no user.
    #[error("Authentication invalid, token invalid")]
    TokenInvalid,

    /// Bearer token could not be issued.
    #[error("credential issuance failed")]
    TokenIssue,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
