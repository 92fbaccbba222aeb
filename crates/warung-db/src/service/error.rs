//! # Service Error Types
//!
//! Unifies business rule violations (warung-core) and persistence
//! failures (this crate) at the workflow boundary, so callers handle a
//! single error type.

use thiserror::Error;
use warung_core::{CoreError, ValidationError};

use crate::error::DbError;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A business rule was violated; the transaction was rolled back.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database operation failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

impl ServiceError {
    /// Whether this error is a business rule violation (as opposed to an
    /// infrastructure failure). Useful for choosing a 4xx-vs-5xx style
    /// response at an outer boundary.
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Core(_) | ServiceError::Db(DbError::NotFound { .. })
        )
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
