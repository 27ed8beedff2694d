//! Uniform sender capability implemented by raw providers and by every
//! decorator stacked on top of them

use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::Context;
use crate::errors::SmsError;

/// Template placeholder name to value
pub type TemplateArgs = HashMap<String, String>;

/// Trait for SMS service integration
#[async_trait]
pub trait SmsServiceTrait: Send + Sync {
    /// Deliver template `template_id` rendered with `args` to every number
    /// in `numbers`.
    ///
    /// Cancellation of `ctx` must surface as `SmsError::Cancelled` or
    /// `SmsError::DeadlineExceeded`, never as a provider failure.
    async fn send(
        &self,
        ctx: &Context,
        template_id: &str,
        args: &TemplateArgs,
        numbers: &[String],
    ) -> Result<(), SmsError>;

    /// Name used in logs and error messages
    fn provider_name(&self) -> &str;
}
