//! In-process code store for deployments without Redis
//!
//! A single mutex guards the whole LRU map, and every operation does its
//! check and its mutation under one acquisition.

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use cg_core::domain::entities::verification_code::{code_key, CodeRecord};
use cg_core::{CodeCacheTrait, CodeError, Context};
use cg_shared::phone::mask_phone_number;
use cg_shared::CodeConfig;

#[derive(Debug)]
struct CodeItem {
    record: CodeRecord,
    expires_at: Instant,
}

impl CodeItem {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Bounded LRU code store local to this process
pub struct LocalCodeCache {
    cache: Mutex<LruCache<String, CodeItem>>,
    ttl: Duration,
    /// Remaining lifetime above which a resend is refused
    cooldown_threshold: Duration,
    max_attempts: u32,
}

impl LocalCodeCache {
    /// Hold at most `max_entries` codes; the least recently used one is
    /// evicted first
    pub fn new(max_entries: usize, config: &CodeConfig) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_seconds),
            cooldown_threshold: Duration::from_secs(config.cooldown_ttl_threshold()),
            max_attempts: config.max_attempts,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, CodeItem>>, CodeError> {
        self.cache
            .lock()
            .map_err(|_| CodeError::system("local code cache lock poisoned"))
    }
}

#[async_trait]
impl CodeCacheTrait for LocalCodeCache {
    async fn set(&self, ctx: &Context, scope: &str, phone: &str, code: &str) -> Result<(), CodeError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let key = code_key(scope, phone);
        let now = Instant::now();
        let mut cache = self.lock()?;

        if let Some(item) = cache.peek(&key).filter(|item| item.is_live(now)) {
            let remaining = item.expires_at - now;
            if remaining > self.cooldown_threshold {
                return Err(CodeError::SendTooFrequent);
            }
        }

        cache.put(
            key,
            CodeItem {
                record: CodeRecord::new(code, self.max_attempts),
                expires_at: now + self.ttl,
            },
        );
        debug!(phone = %mask_phone_number(phone), scope = scope, "Code stored in local cache");
        Ok(())
    }

    async fn verify(
        &self,
        ctx: &Context,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let key = code_key(scope, phone);
        let now = Instant::now();
        let mut cache = self.lock()?;

        let expired = matches!(cache.peek(&key), Some(item) if !item.is_live(now));
        if expired {
            cache.pop(&key);
        }

        let item = cache.get_mut(&key).ok_or(CodeError::NotFound)?;
        item.record.attempt(input)
    }
}
