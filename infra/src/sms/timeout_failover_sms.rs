//! Consecutive-timeout circuit breaker over SMS providers
//!
//! Sticks to the current provider until more than `threshold` sends in a
//! row have timed out, then moves to the next one. Only timeouts count;
//! other errors are returned without touching the breaker.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};

use super::provider_state::ProviderState;

/// SMS service sending through one provider at a time
pub struct TimeoutFailoverSmsService {
    providers: Vec<Arc<dyn SmsServiceTrait>>,
    state: Arc<ProviderState>,
    threshold: u64,
    send_timeout: Option<Duration>,
}

impl TimeoutFailoverSmsService {
    pub fn new(providers: Vec<Arc<dyn SmsServiceTrait>>, threshold: u64) -> Self {
        Self::with_state(providers, threshold, Arc::new(ProviderState::new()))
    }

    /// Break using `state`, possibly shared with other chains
    pub fn with_state(
        providers: Vec<Arc<dyn SmsServiceTrait>>,
        threshold: u64,
        state: Arc<ProviderState>,
    ) -> Self {
        info!(
            providers = ?providers.iter().map(|p| p.provider_name()).collect::<Vec<_>>(),
            threshold = threshold,
            "Initializing timeout failover SMS service"
        );
        Self {
            providers,
            state,
            threshold,
            send_timeout: None,
        }
    }

    /// Bound each provider call; exceeding it counts as a timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> &Arc<ProviderState> {
        &self.state
    }
}

#[async_trait]
impl SmsServiceTrait for TimeoutFailoverSmsService {
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let n = self.providers.len();
        if n == 0 {
            return Err(SmsError::NoProviders);
        }

        let observed = self.state.snapshot();
        if observed.failures > self.threshold {
            if self.state.try_advance(observed, n) {
                warn!(
                    from = self.providers[observed.index % n].provider_name(),
                    to = self.providers[(observed.index + 1) % n].provider_name(),
                    consecutive_timeouts = observed.failures,
                    "Switching SMS provider after repeated timeouts"
                );
            } else {
                debug!("Breaker state changed concurrently, re-reading provider");
            }
        }
        let idx = self.state.current_index() % n;
        let provider = &self.providers[idx];

        let call_ctx = match self.send_timeout {
            Some(timeout) => ctx.child_with_timeout(timeout),
            None => ctx.clone(),
        };

        match provider.send(&call_ctx, template_id, args, numbers).await {
            Ok(()) => {
                self.state.record_success();
                Ok(())
            }
            Err(SmsError::DeadlineExceeded) => {
                let count = self.state.record_timeout();
                warn!(
                    provider = provider.provider_name(),
                    consecutive_timeouts = count,
                    "SMS provider timed out"
                );
                Err(SmsError::DeadlineExceeded)
            }
            Err(e) => Err(e),
        }
    }

    fn provider_name(&self) -> &str {
        "timeout_failover"
    }
}
