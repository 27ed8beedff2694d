//! Round-robin failover across SMS providers
//!
//! Every send takes a sequence number from the shared [`ProviderState`] and
//! starts at `sequence % n`, then walks the providers in order until one
//! accepts the message. Cancellation is the caller's decision, so a
//! cancelled or expired context ends the walk immediately.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use cg_core::{Context, SmsError, SmsServiceTrait, TemplateArgs};

use super::provider_state::ProviderState;

/// SMS service trying each provider once per send, starting from a
/// rotating offset
pub struct FailoverSmsService {
    providers: Vec<Arc<dyn SmsServiceTrait>>,
    state: Arc<ProviderState>,
}

impl FailoverSmsService {
    pub fn new(providers: Vec<Arc<dyn SmsServiceTrait>>) -> Self {
        Self::with_state(providers, Arc::new(ProviderState::new()))
    }

    /// Rotate using `state`, possibly shared with other chains
    pub fn with_state(providers: Vec<Arc<dyn SmsServiceTrait>>, state: Arc<ProviderState>) -> Self {
        info!(
            providers = ?providers.iter().map(|p| p.provider_name()).collect::<Vec<_>>(),
            "Initializing round-robin failover SMS service"
        );
        Self { providers, state }
    }

    pub fn state(&self) -> &Arc<ProviderState> {
        &self.state
    }
}

#[async_trait]
impl SmsServiceTrait for FailoverSmsService {
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError> {
        // A dead context must not consume a sequence number
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let n = self.providers.len();
        if n == 0 {
            return Err(SmsError::NoProviders);
        }

        let start = (self.state.next_sequence() % n as u64) as usize;
        let mut last_error = SmsError::NoProviders;

        for i in 0..n {
            let provider = &self.providers[(start + i) % n];
            match provider.send(ctx, template_id, args, numbers).await {
                Ok(()) => {
                    info!(provider = provider.provider_name(), attempt = i + 1, "SMS sent");
                    return Ok(());
                }
                Err(e) if e.is_context_error() => return Err(e),
                Err(e) => {
                    if let Some(ctx_err) = ctx.err() {
                        return Err(ctx_err.into());
                    }
                    warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        attempt = i + 1,
                        "SMS provider failed, trying next"
                    );
                    last_error = e;
                }
            }
        }

        error!(attempts = n, error = %last_error, "All SMS providers failed");
        Err(SmsError::ProvidersExhausted {
            attempts: n,
            last_error: Box::new(last_error),
        })
    }

    fn provider_name(&self) -> &str {
        "failover"
    }
}
