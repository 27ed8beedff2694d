use async_trait::async_trait;

use crate::context::Context;
use crate::errors::LimitError;

/// Trait for sliding-window rate limiters
#[async_trait]
pub trait LimiterTrait: Send + Sync {
    /// Record a request for `key` and report whether it exceeded the quota.
    ///
    /// `Ok(true)` means limited; the rejected request is not recorded.
    /// Backend failures are returned, never treated as "admit".
    async fn limit(&self, ctx: &Context, key: &str) -> Result<bool, LimitError>;
}
