//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Code store backend selection (Redis or in-process)
//! - `code` - Code lifetime, resend cooldown and attempt limits
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Sliding-window limit in front of SMS providers
//! - `sms` - Provider list and failover strategy

pub mod cache;
pub mod code;
pub mod environment;
pub mod rate_limit;
pub mod sms;

use serde::{Deserialize, Serialize};

pub use cache::{CacheConfig, CacheStrategyConfig, CacheType, MemoryCacheConfig};
pub use code::CodeConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use sms::{FailoverStrategy, SmsConfig, TwilioSettings};

/// Prefix for environment overrides read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "CODEGUARD";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Code issuance configuration
    pub code: CodeConfig,

    /// Code store and limiter backend
    pub cache: CacheStrategyConfig,

    /// Outbound rate limiting
    pub rate_limit: RateLimitConfig,

    /// SMS providers
    pub sms: SmsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Configuration for an isolated development process: in-process
    /// storage and the local SMS provider.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            code: CodeConfig::default(),
            cache: CacheStrategyConfig::memory(10_000),
            rate_limit: RateLimitConfig::default(),
            sms: SmsConfig::local(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Load configuration from plain environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            code: CodeConfig::from_env(),
            cache: CacheStrategyConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            sms: SmsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Load layered configuration: built-in defaults, then the optional
    /// per-environment TOML file, then `CODEGUARD__SECTION__KEY` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let environment = Environment::from_env();
        Self::load_from(environment.config_file(), environment)
    }

    /// Same as [`AppConfig::load`] with an explicit file path
    pub fn load_from(path: &str, environment: Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = settings.try_deserialize()?;
        app.environment = environment;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.cache.cache_type, CacheType::Memory);
        assert_eq!(config.sms.providers, vec!["local".to_string()]);
        assert_eq!(config.sms.strategy, FailoverStrategy::None);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load_from("does-not-exist.toml", Environment::Staging).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.code.ttl_seconds, 600);
        assert_eq!(config.rate_limit.key, "sms:localsms");
    }
}
