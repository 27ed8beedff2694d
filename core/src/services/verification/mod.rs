//! Verification code workflow
//!
//! - Code generation and issuance through a [`CodeCacheTrait`] store
//! - Delivery through any [`crate::services::SmsServiceTrait`] stack
//! - Verification with the attempt limit masked as a plain mismatch

mod config;
mod service;
mod traits;
mod types;


pub use config::CodeServiceConfig;
pub use service::{CodeService, DynCodeService};
pub use traits::CodeCacheTrait;
pub use types::SendCodeResult;
