//! Error types for reconciliation.
//!
//! Two layers are kept apart:
//! - [`ApiError`]: a typed condition raised by the provider API client.
//! - [`HandlerError`]: a terminal outcome reported to the scheduler, tagged
//!   with a [`HandlerErrorCode`].
//!
//! Handlers translate the first into the second at the point where the
//! meaning of a provider condition is known (a not-found during a pre-delete
//! check means something different from a not-found during an update).

use crate::types::TYPE_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias for provider API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Kinds of provider errors, used to select which ones are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// The environment does not exist.
    NotFound,
    /// The provider rejected the request as invalid.
    Validation,
    /// The provider failed internally.
    InternalServer,
    /// The caller is not allowed to perform the call.
    AccessDenied,
    /// Anything else.
    Other,
}

impl ApiErrorKind {
    /// Kinds absorbed by the create retry policy.
    pub const TRANSIENT: [Self; 2] = [Self::Validation, Self::InternalServer];

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Validation => "Request validation failed",
            Self::InternalServer => "Provider internal error",
            Self::AccessDenied => "Access denied",
            Self::Other => "Unexpected provider error",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Conditions surfaced by the provider API client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InternalServer(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::NotFound(_) => ApiErrorKind::NotFound,
            Self::Validation(_) => ApiErrorKind::Validation,
            Self::InternalServer(_) => ApiErrorKind::InternalServer,
            Self::AccessDenied(_) => ApiErrorKind::AccessDenied,
            Self::Other(_) => ApiErrorKind::Other,
        }
    }

    /// The provider's message.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::InternalServer(m)
            | Self::AccessDenied(m)
            | Self::Other(m) => m,
        }
    }

    /// Check if this is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Terminal error kinds reported to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    /// Target absent when existence was required.
    NotFound,
    /// Target present when absence was required.
    AlreadyExists,
    /// Client-supplied data rejected, or create retries exhausted.
    InvalidRequest,
    /// Target vanished during the update call.
    NotUpdatable,
    /// Target reached a failure status while being watched.
    NotStabilized,
    /// Caller lacks permission for a provider call.
    AccessDenied,
    /// Provider failed internally outside of a retried path.
    ServiceInternalError,
    /// Anything the taxonomy above does not name.
    InternalFailure,
}

impl fmt::Display for HandlerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A terminal failure with its kind and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct HandlerError {
    pub code: HandlerErrorCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(identifier: &str) -> Self {
        Self::new(
            HandlerErrorCode::NotFound,
            format!("Resource of type '{TYPE_NAME}' with identifier '{identifier}' was not found."),
        )
    }

    pub fn already_exists(identifier: &str) -> Self {
        Self::new(
            HandlerErrorCode::AlreadyExists,
            format!(
                "Resource of type '{TYPE_NAME}' with identifier '{identifier}' already exists."
            ),
        )
    }

    pub fn not_updatable(identifier: &str) -> Self {
        Self::new(
            HandlerErrorCode::NotUpdatable,
            format!(
                "Resource of type '{TYPE_NAME}' with identifier '{identifier}' is not updatable with parameters provided."
            ),
        )
    }

    pub fn invalid_request(detail: impl AsRef<str>) -> Self {
        Self::new(
            HandlerErrorCode::InvalidRequest,
            format!("Invalid request provided: {}", detail.as_ref()),
        )
    }

    pub fn not_stabilized(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorCode::NotStabilized, message)
    }

    /// Map a provider error with no operation-specific meaning.
    pub fn from_api(err: &ApiError, identifier: &str) -> Self {
        match err {
            ApiError::NotFound(_) => Self::not_found(identifier),
            ApiError::Validation(m) => Self::invalid_request(m),
            ApiError::AccessDenied(m) => Self::new(HandlerErrorCode::AccessDenied, m.clone()),
            ApiError::InternalServer(m) => {
                Self::new(HandlerErrorCode::ServiceInternalError, m.clone())
            }
            ApiError::Other(m) => Self::new(HandlerErrorCode::InternalFailure, m.clone()),
        }
    }
}
