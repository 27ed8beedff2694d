//! Local SMS Service Implementation
//!
//! Logs messages instead of sending them. Used for development, for
//! isolated deployments, and as a scriptable provider in tests: it can be
//! told to fail or to take a fixed time per send.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};
use cg_shared::phone::{is_valid_phone, mask_phone_number};

use super::template::Templates;

/// Local SMS service
///
/// Clones share counters and the failure switch.
#[derive(Clone)]
pub struct LocalSmsService {
    name: String,
    templates: Templates,
    /// Messages delivered, one per recipient
    message_count: Arc<AtomicU64>,
    /// Calls to `send`, successful or not
    call_count: Arc<AtomicU64>,
    /// Whether to simulate failures
    simulate_failure: Arc<AtomicBool>,
    /// Simulated network latency
    latency: Option<Duration>,
}

impl LocalSmsService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Templates::default(),
            message_count: Arc::new(AtomicU64::new(0)),
            call_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(false)),
            latency: None,
        }
    }

    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    /// Take `latency` per send; a context deadline shorter than this makes
    /// the send time out
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn failing(self) -> Self {
        self.simulate_failure.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for LocalSmsService {
    fn default() -> Self {
        Self::new("local")
    }
}

#[async_trait]
impl SmsServiceTrait for LocalSmsService {
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(invalid) = numbers.iter().find(|n| !is_valid_phone(n)) {
            return Err(SmsError::InvalidRecipient {
                recipient: mask_phone_number(invalid),
            });
        }

        if let Some(latency) = self.latency {
            ctx.run(tokio::time::sleep(latency)).await?;
        } else if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = %self.name, "Local SMS service simulating failure");
            return Err(SmsError::provider(&self.name, "simulated SMS sending failure"));
        }

        let body = self.templates.render_or_describe(template_id, args);
        for number in numbers {
            let message_id = format!("local_{}", Uuid::new_v4());
            let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
            info!(
                target: "sms_service",
                provider = %self.name,
                phone = %mask_phone_number(number),
                message_id = %message_id,
                message_number = count,
                body = %body,
                "SMS sent (local)"
            );
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
