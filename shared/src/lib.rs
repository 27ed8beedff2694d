//! Shared utilities and configuration for Codeguard
//!
//! This crate provides functionality used across the workspace:
//! - Configuration types for code issuance, storage, rate limiting and SMS delivery
//! - Environment detection and logging configuration
//! - Phone number utilities (validation, masking for logs)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CacheStrategyConfig, CacheType, CodeConfig, Environment,
    FailoverStrategy, LogFormat, LoggingConfig, MemoryCacheConfig, RateLimitConfig, SmsConfig,
    TwilioSettings,
};
pub use utils::phone;
