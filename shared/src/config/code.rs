//! Verification code configuration

use serde::{Deserialize, Serialize};

/// Lifetime, cooldown and attempt limits for issued codes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeConfig {
    /// Seconds a code stays valid after issuance
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Minimum seconds between two sends to the same scope and recipient
    #[serde(default = "default_resend_interval_seconds")]
    pub resend_interval_seconds: u64,

    /// Verification attempts allowed per issued code
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Number of digits in a code (1..=9)
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Provider template used to deliver codes
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Business scope used when a caller does not name one
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            resend_interval_seconds: default_resend_interval_seconds(),
            max_attempts: default_max_attempts(),
            code_length: default_code_length(),
            template_id: default_template_id(),
            scope: default_scope(),
        }
    }
}

impl CodeConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env_or("CODE_TTL_SECONDS", defaults.ttl_seconds),
            resend_interval_seconds: env_or(
                "CODE_RESEND_INTERVAL_SECONDS",
                defaults.resend_interval_seconds,
            ),
            max_attempts: env_or("CODE_MAX_ATTEMPTS", defaults.max_attempts),
            code_length: env_or("CODE_LENGTH", defaults.code_length),
            template_id: std::env::var("CODE_TEMPLATE_ID").unwrap_or(defaults.template_id),
            scope: std::env::var("CODE_SCOPE").unwrap_or(defaults.scope),
        }
    }

    /// Seconds of remaining lifetime above which a resend is rejected
    pub fn cooldown_ttl_threshold(&self) -> u64 {
        self.ttl_seconds.saturating_sub(self.resend_interval_seconds)
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_ttl_seconds() -> u64 {
    600 // 10 minutes
}

fn default_resend_interval_seconds() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_code_length() -> usize {
    6
}

fn default_template_id() -> String {
    String::from("login_code")
}

fn default_scope() -> String {
    String::from("login")
}
