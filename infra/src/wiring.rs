//! Configuration-driven construction of the code service stack
//!
//! The cache type picks Redis or in-process variants of both the code
//! store and the limiter. Providers are built in configured order, then
//! wrapped by the configured failover strategy and, when enabled, by the
//! rate-limiting decorator.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use cg_core::domain::entities::verification_code::{is_supported_code_length, MAX_CODE_LENGTH};
use cg_core::{CodeCacheTrait, CodeService, CodeServiceConfig, DynCodeService, LimiterTrait, SmsServiceTrait};
use cg_shared::{AppConfig, CacheStrategyConfig, CacheType, CodeConfig, FailoverStrategy, RateLimitConfig, SmsConfig};

use crate::cache::{LocalCodeCache, RedisClient, RedisCodeCache};
use crate::services::ratelimit::{LocalSlidingWindowLimiter, RedisSlidingWindowLimiter};
use crate::sms::{
    FailoverSmsService, LocalSmsService, RateLimitSmsService, Templates, TimeoutFailoverSmsService,
};
use crate::InfrastructureError;

/// Connect to Redis when the configuration asks for it
pub async fn connect_redis(
    cache: &CacheStrategyConfig,
) -> Result<Option<Arc<RedisClient>>, InfrastructureError> {
    match cache.cache_type {
        CacheType::Redis => {
            let client = RedisClient::new(cache.redis.clone()).await?;
            if !client.health_check().await? {
                return Err(InfrastructureError::Config(
                    "Redis did not answer PING".to_string(),
                ));
            }
            Ok(Some(Arc::new(client)))
        }
        CacheType::Memory => Ok(None),
    }
}

/// Redis-backed store when a client is given, otherwise the local LRU store
pub fn build_code_cache(
    redis: Option<&Arc<RedisClient>>,
    cache: &CacheStrategyConfig,
    code: &CodeConfig,
) -> Arc<dyn CodeCacheTrait> {
    match redis {
        Some(client) => Arc::new(RedisCodeCache::new(client.clone(), code)),
        None => Arc::new(LocalCodeCache::new(cache.memory.max_entries, code)),
    }
}

/// Redis-backed limiter when a client is given, otherwise the local one
pub fn build_limiter(
    redis: Option<&Arc<RedisClient>>,
    rate_limit: &RateLimitConfig,
) -> Arc<dyn LimiterTrait> {
    match redis {
        Some(client) => Arc::new(RedisSlidingWindowLimiter::from_config(client.clone(), rate_limit)),
        None => Arc::new(LocalSlidingWindowLimiter::from_config(rate_limit)),
    }
}

/// Build one provider by name
pub fn build_provider(
    name: &str,
    sms: &SmsConfig,
) -> Result<Arc<dyn SmsServiceTrait>, InfrastructureError> {
    let templates = Templates::new(sms.templates.clone());
    match name {
        "local" => Ok(Arc::new(LocalSmsService::new("local").with_templates(templates))),
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            let settings = sms.twilio.clone().ok_or_else(|| {
                InfrastructureError::Config("twilio provider configured without credentials".to_string())
            })?;
            Ok(Arc::new(crate::sms::TwilioSmsService::new(settings, templates)?))
        }
        other => Err(InfrastructureError::Config(format!("Unknown SMS provider: {}", other))),
    }
}

/// Providers wrapped by the configured failover strategy, then by the
/// rate-limiting decorator when `limiter` is given
pub fn build_sms_service(
    sms: &SmsConfig,
    limiter: Option<Arc<dyn LimiterTrait>>,
    rate_limit: &RateLimitConfig,
) -> Result<Arc<dyn SmsServiceTrait>, InfrastructureError> {
    let providers = sms
        .providers
        .iter()
        .map(|name| build_provider(name, sms))
        .collect::<Result<Vec<_>, _>>()?;

    let chain: Arc<dyn SmsServiceTrait> = match (sms.strategy, providers.len()) {
        (_, 0) => {
            return Err(InfrastructureError::Config("No SMS providers configured".to_string()));
        }
        (FailoverStrategy::None, _) | (_, 1) => providers[0].clone(),
        (FailoverStrategy::RoundRobin, _) => Arc::new(FailoverSmsService::new(providers)),
        (FailoverStrategy::Timeout, _) => {
            let service = TimeoutFailoverSmsService::new(providers, sms.timeout_threshold);
            match sms.send_timeout_ms {
                Some(ms) => Arc::new(service.with_send_timeout(Duration::from_millis(ms))),
                None => Arc::new(service),
            }
        }
    };

    Ok(match limiter {
        Some(limiter) if rate_limit.enabled => {
            Arc::new(RateLimitSmsService::with_key(chain, limiter, rate_limit.key.clone()))
        }
        _ => chain,
    })
}

/// Build the complete code service described by `config`
pub async fn build_code_service(config: &AppConfig) -> Result<DynCodeService, InfrastructureError> {
    if !is_supported_code_length(config.code.code_length) {
        return Err(InfrastructureError::Config(format!(
            "code_length must be between 1 and {}, got {}",
            MAX_CODE_LENGTH, config.code.code_length
        )));
    }

    let redis = connect_redis(&config.cache).await?;

    let cache = build_code_cache(redis.as_ref(), &config.cache, &config.code);
    let limiter = build_limiter(redis.as_ref(), &config.rate_limit);
    let sms = build_sms_service(&config.sms, Some(limiter), &config.rate_limit)?;

    info!(
        cache = ?config.cache.cache_type,
        strategy = ?config.sms.strategy,
        providers = ?config.sms.providers,
        rate_limited = config.rate_limit.enabled,
        "Code service wired"
    );

    Ok(CodeService::new(cache, sms, CodeServiceConfig::from(&config.code)))
}
