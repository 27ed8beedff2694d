//! # Codeguard Core
//!
//! Domain layer for one-time phone verification codes. This crate holds the
//! code record and key format, the error taxonomy, the capability traits
//! implemented by the infrastructure layer (code store, SMS sender, rate
//! limiter), the caller [`Context`] used for cancellation and deadlines, and
//! the [`CodeService`] that orchestrates issuance and verification.

pub mod context;
pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use context::Context;
pub use domain::*;
pub use errors::*;
pub use services::*;
