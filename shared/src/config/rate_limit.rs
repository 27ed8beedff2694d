//! Rate limiting configuration for outbound SMS delivery

use serde::{Deserialize, Serialize};

/// Sliding-window limit applied in front of the SMS providers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Limiter key shared by every outbound send
    #[serde(default = "default_key")]
    pub key: String,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests admitted per window
    #[serde(default = "default_quota")]
    pub quota: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            key: default_key(),
            window_ms: default_window_ms(),
            quota: default_quota(),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SMS_RATE_LIMIT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            key: std::env::var("SMS_RATE_LIMIT_KEY").unwrap_or(defaults.key),
            window_ms: std::env::var("SMS_RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.window_ms),
            quota: std::env::var("SMS_RATE_LIMIT_QUOTA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.quota),
        }
    }

    /// Disabled configuration
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Window length as a `Duration`
    pub fn window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.window_ms)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_key() -> String {
    String::from("sms:localsms")
}

fn default_window_ms() -> u64 {
    1000
}

fn default_quota() -> u32 {
    1000
}
