//! Domain-specific error types and error handling.

mod types;


pub use types::{CodeError, ContextError, LimitError, SmsError};

use thiserror::Error;

/// Errors surfaced by [`crate::services::CodeService`], tagged with the stage
/// that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Code store error: {0}")]
    Store(#[from] CodeError),

    #[error("Code delivery error: {0}")]
    Delivery(#[from] SmsError),
}

impl DomainError {
    /// Whether the caller cancelled or ran out of time, in any stage
    pub fn is_context_error(&self) -> bool {
        matches!(
            self,
            DomainError::Store(CodeError::Cancelled | CodeError::DeadlineExceeded)
                | DomainError::Delivery(SmsError::Cancelled | SmsError::DeadlineExceeded)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
