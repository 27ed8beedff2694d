//! Rate-limiting decorator for SMS senders

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

use cg_core::{Context, LimiterTrait, SmsError, SmsServiceTrait, TemplateArgs};

/// Default limiter key shared by every outbound send
pub const DEFAULT_LIMIT_KEY: &str = "sms:localsms";

/// Consults a sliding-window limiter before delegating to the inner sender.
/// A failing limiter blocks the send.
pub struct RateLimitSmsService {
    inner: Arc<dyn SmsServiceTrait>,
    limiter: Arc<dyn LimiterTrait>,
    key: String,
}

impl RateLimitSmsService {
    pub fn new(inner: Arc<dyn SmsServiceTrait>, limiter: Arc<dyn LimiterTrait>) -> Self {
        Self::with_key(inner, limiter, DEFAULT_LIMIT_KEY)
    }

    pub fn with_key(
        inner: Arc<dyn SmsServiceTrait>,
        limiter: Arc<dyn LimiterTrait>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            limiter,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SmsServiceTrait for RateLimitSmsService {
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError> {
        let limited = self.limiter.limit(ctx, &self.key).await.map_err(|e| {
            let err = SmsError::from(e);
            if !err.is_context_error() {
                error!(key = %self.key, error = %err, "SMS rate limiter failed");
            }
            err
        })?;

        if limited {
            warn!(key = %self.key, "SMS send rate limited");
            return Err(SmsError::RateLimited);
        }

        self.inner.send(ctx, template_id, args, numbers).await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
