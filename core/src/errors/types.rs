//! Error types for each stage of the code lifecycle
//!
//! Store, delivery and rate-limit failures are kept apart so callers can tell
//! which stage failed. Context errors (`Cancelled`, `DeadlineExceeded`) appear
//! in every stage and are always propagated verbatim.

use thiserror::Error;

/// Why a caller context stopped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Code store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// A code for this key was issued within the resend interval
    #[error("verification code sent too frequently")]
    SendTooFrequent,

    /// Every verification attempt for the current code has been used
    #[error("too many verification attempts")]
    VerifyTooMany,

    /// No live code exists for this key
    #[error("no verification code to check")]
    NotFound,

    #[error("code store call cancelled")]
    Cancelled,

    #[error("code store call deadline exceeded")]
    DeadlineExceeded,

    /// Backend malfunction or unexpected backend reply
    #[error("code store system error: {message}")]
    System { message: String },
}

impl CodeError {
    pub fn system(message: impl Into<String>) -> Self {
        CodeError::System {
            message: message.into(),
        }
    }
}

impl From<ContextError> for CodeError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => CodeError::Cancelled,
            ContextError::DeadlineExceeded => CodeError::DeadlineExceeded,
        }
    }
}

/// Rate limiter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("rate limiter call cancelled")]
    Cancelled,

    #[error("rate limiter call deadline exceeded")]
    DeadlineExceeded,

    #[error("rate limiter backend error: {message}")]
    Backend { message: String },
}

impl LimitError {
    pub fn backend(message: impl Into<String>) -> Self {
        LimitError::Backend {
            message: message.into(),
        }
    }
}

impl From<ContextError> for LimitError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => LimitError::Cancelled,
            ContextError::DeadlineExceeded => LimitError::DeadlineExceeded,
        }
    }
}

/// SMS delivery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    #[error("sms send cancelled")]
    Cancelled,

    #[error("sms send deadline exceeded")]
    DeadlineExceeded,

    /// The outbound limiter rejected the send
    #[error("sms sending is rate limited")]
    RateLimited,

    /// The outbound limiter itself failed; sends are refused
    #[error("sms rate limiter failed: {0}")]
    Limiter(LimitError),

    /// Every provider in a failover chain failed
    #[error("all {attempts} sms providers failed, last error: {last_error}")]
    ProvidersExhausted {
        attempts: usize,
        last_error: Box<SmsError>,
    },

    /// A failover chain was built without providers
    #[error("no sms providers configured")]
    NoProviders,

    #[error("invalid recipient: {recipient}")]
    InvalidRecipient { recipient: String },

    /// A single provider rejected the send
    #[error("sms provider {provider} failed: {message}")]
    Provider { provider: String, message: String },
}

impl SmsError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SmsError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Caller-intended stop; never retried on another provider
    pub fn is_context_error(&self) -> bool {
        matches!(self, SmsError::Cancelled | SmsError::DeadlineExceeded)
    }

    /// Provider did not answer in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, SmsError::DeadlineExceeded)
    }
}

impl From<ContextError> for SmsError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => SmsError::Cancelled,
            ContextError::DeadlineExceeded => SmsError::DeadlineExceeded,
        }
    }
}

impl From<LimitError> for SmsError {
    fn from(err: LimitError) -> Self {
        match err {
            LimitError::Cancelled => SmsError::Cancelled,
            LimitError::DeadlineExceeded => SmsError::DeadlineExceeded,
            other => SmsError::Limiter(other),
        }
    }
}
