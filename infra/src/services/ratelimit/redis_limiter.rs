//! Redis-based sliding-window limiter

use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use cg_core::{Context, LimitError, LimiterTrait};
use cg_shared::RateLimitConfig;

use crate::cache::RedisClient;

const SLIDE_WINDOW_SCRIPT: &str = include_str!("lua/slide_window.lua");

/// Sliding-window limiter shared by every process using the same Redis.
///
/// Each key holds a sorted set of admitted request timestamps in
/// milliseconds; the script purges, counts and records in one step.
pub struct RedisSlidingWindowLimiter {
    client: Arc<RedisClient>,
    script: Script,
    window: Duration,
    quota: u32,
}

impl RedisSlidingWindowLimiter {
    pub fn new(client: Arc<RedisClient>, window: Duration, quota: u32) -> Self {
        Self {
            client,
            script: Script::new(SLIDE_WINDOW_SCRIPT),
            window,
            quota,
        }
    }

    pub fn from_config(client: Arc<RedisClient>, config: &RateLimitConfig) -> Self {
        Self::new(client, config.window(), config.quota)
    }
}

#[async_trait]
impl LimiterTrait for RedisSlidingWindowLimiter {
    async fn limit(&self, ctx: &Context, key: &str) -> Result<bool, LimitError> {
        let now = Utc::now().timestamp_millis();
        // Two admissions in the same millisecond need distinct members
        let member = format!("{}-{}", now, Uuid::new_v4());

        let mut invocation = self.script.prepare_invoke();
        invocation
            .key(self.client.key(key))
            .arg(self.window.as_millis() as u64)
            .arg(self.quota)
            .arg(now)
            .arg(member);

        let res: i64 = ctx.run(self.client.invoke(&invocation)).await??;
        match res {
            0 => Ok(false),
            1 => {
                tracing::debug!(key = key, "Request limited");
                Ok(true)
            }
            other => Err(LimitError::backend(format!("unexpected slide_window reply {}", other))),
        }
    }
}
