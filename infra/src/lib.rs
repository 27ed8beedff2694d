//! # Infrastructure Layer
//!
//! Concrete implementations of the capabilities defined in `cg_core`:
//!
//! - **Cache**: Redis client, Redis-backed and in-process code stores
//! - **Rate limiting**: Redis and in-process sliding-window limiters
//! - **SMS**: providers (local, Twilio) and the decorators that compose
//!   them (round-robin failover, timeout failover, rate limiting)
//! - **Wiring**: building the configured stack from `cg_shared::AppConfig`
//!
//! ## Features
//!
//! - `twilio-sms`: Enable Twilio SMS service (default)

// Re-export core types for convenience
pub use cg_core::errors::*;

/// Cache module - Redis client and code stores
pub mod cache;

/// Services module - Infrastructure service implementations
pub mod services;

/// SMS service module - Providers and sender decorators
pub mod sms;

/// Tracing subscriber setup
pub mod logging;

/// Configuration-driven construction of the service stack
pub mod wiring;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for CodeError {
    fn from(err: InfrastructureError) -> Self {
        CodeError::system(err.to_string())
    }
}

impl From<InfrastructureError> for LimitError {
    fn from(err: InfrastructureError) -> Self {
        LimitError::backend(err.to_string())
    }
}
