//! Domain error taxonomy (spec §4.1).
//!
//! A closed set of failure kinds. Each carries a fixed HTTP status and a
//! stable short code (`title()`) used by the RFC 7807 mapper in `apiv2-api`.
//! `NotModified` is not a failure — it is modeled here for uniformity since
//! the repository/service layer reports it through the same `Result` shape.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {message}")]
    Validation { message: String, field: Option<String> },

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("precondition failed")]
    PreconditionFailed,

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("precondition required")]
    PreconditionRequired,

    #[error("not modified")]
    NotModified,

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation { .. } => 400,
            DomainError::Unauthorized => 401,
            DomainError::Forbidden => 403,
            DomainError::NotFound => 404,
            DomainError::MethodNotAllowed => 405,
            DomainError::Conflict(_) => 409,
            DomainError::PreconditionFailed => 412,
            DomainError::PayloadTooLarge => 413,
            DomainError::UnsupportedMediaType => 415,
            DomainError::PreconditionRequired => 428,
            DomainError::NotModified => 304,
            DomainError::Internal(_) => 500,
        }
    }

    /// Stable short code (RFC 7807 `title`).
    pub fn title(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "ValidationError",
            DomainError::Unauthorized => "UnauthorizedError",
            DomainError::Forbidden => "ForbiddenError",
            DomainError::NotFound => "NotFoundError",
            DomainError::MethodNotAllowed => "MethodNotAllowedError",
            DomainError::Conflict(_) => "ConflictError",
            DomainError::PreconditionFailed => "PreconditionFailedError",
            DomainError::PayloadTooLarge => "PayloadTooLargeError",
            DomainError::UnsupportedMediaType => "UnsupportedMediaTypeError",
            DomainError::PreconditionRequired => "PreconditionRequiredError",
            DomainError::NotModified => "NotModifiedError",
            DomainError::Internal(_) => "InternalError",
        }
    }

    /// `field` value for the RFC 7807 body, if this is a field-level validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
