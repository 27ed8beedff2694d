//! SMS delivery configuration
//!
//! Lists the providers in failover order and picks how they are composed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How multiple providers are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverStrategy {
    /// Use only the first provider
    None,
    /// Try every provider in turn, starting from a rotating offset
    RoundRobin,
    /// Stick to one provider until it times out repeatedly
    Timeout,
}

impl std::str::FromStr for FailoverStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(FailoverStrategy::None),
            "round_robin" | "round-robin" | "roundrobin" => Ok(FailoverStrategy::RoundRobin),
            "timeout" => Ok(FailoverStrategy::Timeout),
            _ => Err(format!("Invalid failover strategy: {}", s)),
        }
    }
}

/// Twilio account settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwilioSettings {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
    /// Attempts per message before giving up
    #[serde(default = "default_twilio_retries")]
    pub max_retries: u32,
    /// Initial backoff between attempts in milliseconds
    #[serde(default = "default_twilio_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl TwilioSettings {
    /// Load from `TWILIO_*` environment variables, `None` when unset
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok()?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER").ok()?;
        Some(Self {
            account_sid,
            auth_token,
            from_number,
            max_retries: std::env::var("TWILIO_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_twilio_retries),
            retry_delay_ms: std::env::var("TWILIO_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_twilio_retry_delay_ms),
        })
    }
}

/// SMS service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Provider names in failover order ("local", "twilio")
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Composition of the providers
    #[serde(default = "default_strategy")]
    pub strategy: FailoverStrategy,

    /// Consecutive timeouts tolerated before the timeout strategy moves on
    #[serde(default = "default_timeout_threshold")]
    pub timeout_threshold: u64,

    /// Per-provider send timeout in milliseconds for the timeout strategy
    #[serde(default)]
    pub send_timeout_ms: Option<u64>,

    /// Twilio credentials
    #[serde(default)]
    pub twilio: Option<TwilioSettings>,

    /// Message bodies keyed by template id; `{name}` placeholders are
    /// replaced with template arguments
    #[serde(default = "default_templates")]
    pub templates: HashMap<String, String>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            strategy: default_strategy(),
            timeout_threshold: default_timeout_threshold(),
            send_timeout_ms: None,
            twilio: None,
            templates: default_templates(),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let providers = std::env::var("SMS_PROVIDERS")
            .map(|v| {
                v.split(',')
                    .map(|p| p.trim().to_lowercase())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.providers);

        Self {
            providers,
            strategy: std::env::var("SMS_FAILOVER_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.strategy),
            timeout_threshold: std::env::var("SMS_TIMEOUT_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_threshold),
            send_timeout_ms: std::env::var("SMS_SEND_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            twilio: TwilioSettings::from_env(),
            templates: defaults.templates,
        }
    }

    /// Single local provider, no failover
    pub fn local() -> Self {
        Self {
            providers: vec![String::from("local")],
            strategy: FailoverStrategy::None,
            ..Default::default()
        }
    }
}

fn default_providers() -> Vec<String> {
    vec![String::from("local")]
}

fn default_strategy() -> FailoverStrategy {
    FailoverStrategy::RoundRobin
}

fn default_timeout_threshold() -> u64 {
    3
}

fn default_twilio_retries() -> u32 {
    3
}

fn default_twilio_retry_delay_ms() -> u64 {
    1000
}

fn default_templates() -> HashMap<String, String> {
    let mut templates = HashMap::new();
    templates.insert(
        String::from("login_code"),
        String::from("Your verification code is {code}. It expires in 10 minutes."),
    );
    templates
}
