//! Redis-backed code store
//!
//! Each operation is one server-side script, so the check-and-mutate step
//! is indivisible with respect to every other client of the same Redis.

use async_trait::async_trait;
use redis::Script;
use std::sync::Arc;
use tracing::{debug, error};

use cg_core::domain::entities::verification_code::{attempts_key, code_key};
use cg_core::{CodeCacheTrait, CodeError, Context};
use cg_shared::phone::mask_phone_number;
use cg_shared::CodeConfig;

use super::redis_client::RedisClient;

const SET_CODE_SCRIPT: &str = include_str!("lua/set_code.lua");
const VERIFY_CODE_SCRIPT: &str = include_str!("lua/verify_code.lua");

/// Code store shared by every process pointing at the same Redis
pub struct RedisCodeCache {
    client: Arc<RedisClient>,
    set_script: Script,
    verify_script: Script,
    ttl_seconds: u64,
    cooldown_threshold_seconds: u64,
    max_attempts: u32,
}

impl RedisCodeCache {
    pub fn new(client: Arc<RedisClient>, config: &CodeConfig) -> Self {
        Self {
            client,
            set_script: Script::new(SET_CODE_SCRIPT),
            verify_script: Script::new(VERIFY_CODE_SCRIPT),
            ttl_seconds: config.ttl_seconds,
            cooldown_threshold_seconds: config.cooldown_ttl_threshold(),
            max_attempts: config.max_attempts,
        }
    }

    fn keys(&self, scope: &str, phone: &str) -> (String, String) {
        let key = self.client.key(&code_key(scope, phone));
        let cnt_key = attempts_key(&key);
        (key, cnt_key)
    }
}

#[async_trait]
impl CodeCacheTrait for RedisCodeCache {
    async fn set(&self, ctx: &Context, scope: &str, phone: &str, code: &str) -> Result<(), CodeError> {
        let (key, cnt_key) = self.keys(scope, phone);

        let mut invocation = self.set_script.prepare_invoke();
        invocation
            .key(&key)
            .key(&cnt_key)
            .arg(code)
            .arg(self.ttl_seconds)
            .arg(self.cooldown_threshold_seconds)
            .arg(self.max_attempts);

        let res: i64 = ctx.run(self.client.invoke(&invocation)).await??;
        match res {
            0 => {
                debug!(phone = %mask_phone_number(phone), scope = scope, "Code stored in Redis");
                Ok(())
            }
            -1 => Err(CodeError::SendTooFrequent),
            -2 => {
                error!(key = %key, "Code key exists without expiry");
                Err(CodeError::system("code key exists without expiry"))
            }
            other => Err(CodeError::system(format!("unexpected set_code reply {}", other))),
        }
    }

    async fn verify(
        &self,
        ctx: &Context,
        scope: &str,
        phone: &str,
        input: &str,
    ) -> Result<bool, CodeError> {
        let (key, cnt_key) = self.keys(scope, phone);

        let mut invocation = self.verify_script.prepare_invoke();
        invocation.key(&key).key(&cnt_key).arg(input);

        let res: i64 = ctx.run(self.client.invoke(&invocation)).await??;
        match res {
            0 => Ok(true),
            1 => Ok(false),
            -1 => Err(CodeError::VerifyTooMany),
            -2 => Err(CodeError::NotFound),
            -3 => {
                error!(key = %cnt_key, "Attempt counter missing for live code");
                Err(CodeError::system("attempt counter missing"))
            }
            other => Err(CodeError::system(format!("unexpected verify_code reply {}", other))),
        }
    }
}
