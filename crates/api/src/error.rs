//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures internal errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; domain errors are raised at the point of detection
//! and mapped to a response exactly once, here.
//!
//! The wire envelope is `{"msg": ..., "stack": ...}` with `stack` populated
//! only in debug builds.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::payments::GatewayError;
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, including duplicate unique keys.
    #[error("{0}")]
    Validation(String),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Valid credential, insufficient privilege.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Payment provider call failed (fail-fast, no compensation).
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    msg: String,
    stack: Option<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_)
                | AuthError::MissingCredentials
                | AuthError::WeakPassword(_)
                | AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::UnknownEmail
                | AuthError::WrongPassword
                | AuthError::TokenMissing
                | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::TokenIssue | AuthError::PasswordHash | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Authorization(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Conflict(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::Backend(_)) | Self::Gateway(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Internal details are replaced with a generic
    /// message, and the two login failure modes collapse into one so the
    /// response does not reveal whether the email exists.
    fn client_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::UnknownEmail | AuthError::WrongPassword => {
                    "Invalid credentials".to_owned()
                }
                AuthError::TokenIssue | AuthError::PasswordHash | AuthError::Store(_) => {
                    "Internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Store(StoreError::NotFound) => "Not found".to_owned(),
            Self::Store(StoreError::Conflict(msg)) => msg.clone(),
            Self::Store(StoreError::Backend(_)) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::Gateway(_) => "External service error".to_owned(),
            Self::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Backend(_))
                | Self::Gateway(_)
                | Self::Internal(_)
                | Self::Auth(
                    AuthError::TokenIssue | AuthError::PasswordHash | AuthError::Store(_)
                )
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_internal() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ErrorBody {
            msg: self.client_message(),
            // Debug builds are the development environment; release builds
            // never expose internals.
            stack: cfg!(debug_assertions).then(|| format!("{self:?}")),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// JSON extractor whose rejection uses the API error envelope.
///
/// A drop-in replacement for `axum::Json` in handlers: malformed request
/// bodies surface as a 400 `{"msg": ...}` instead of axum's plain-text 422.
#[derive(Debug, Clone, Copy, Default, axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
