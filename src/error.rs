//! Error taxonomy shared by the rating, query and auth services.
//!
//! The HTTP mapping lives in `api::error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed, missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness rule violated (duplicate rating, taken username)
    #[error("{0}")]
    Conflict(String),

    /// Request is well-formed but the catalog forbids it
    #[error("{0}")]
    InvalidState(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    /// Short machine-readable name, sent as `code` in error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::Storage(_) => "internal_error",
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
