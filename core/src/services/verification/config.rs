//! Configuration for the code service

use std::time::Duration;

use cg_shared::CodeConfig;

use crate::domain::entities::verification_code::{DEFAULT_CODE_LENGTH, DEFAULT_TTL_SECONDS};

/// Configuration for the code service
#[derive(Debug, Clone)]
pub struct CodeServiceConfig {
    /// Digits per generated code
    pub code_length: usize,
    /// Template the code is delivered with; receives the `code` argument
    pub template_id: String,
    /// Lifetime of an issued code, reported back to callers
    pub ttl: Duration,
    /// Minimum time between two sends to the same recipient
    pub resend_interval: Duration,
}

impl Default for CodeServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            template_id: String::from("login_code"),
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            resend_interval: Duration::from_secs(60),
        }
    }
}

impl From<&CodeConfig> for CodeServiceConfig {
    fn from(config: &CodeConfig) -> Self {
        Self {
            code_length: config.code_length,
            template_id: config.template_id.clone(),
            ttl: Duration::from_secs(config.ttl_seconds),
            resend_interval: Duration::from_secs(config.resend_interval_seconds),
        }
    }
}
