//! SMS Service Module
//!
//! Providers and the decorators that compose them. Everything here
//! implements [`cg_core::SmsServiceTrait`], so decorators stack in any
//! order chosen at construction time.
//!
//! - **Providers**: [`LocalSmsService`], [`TwilioSmsService`] (feature `twilio-sms`)
//! - **Round-robin failover**: [`FailoverSmsService`]
//! - **Timeout circuit breaker**: [`TimeoutFailoverSmsService`]
//! - **Outbound rate limiting**: [`RateLimitSmsService`]

pub mod failover_sms;
pub mod local_sms;
pub mod provider_state;
pub mod ratelimit_sms;
pub mod template;
pub mod timeout_failover_sms;

// Twilio SMS service (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use failover_sms::FailoverSmsService;
pub use local_sms::LocalSmsService;
pub use provider_state::ProviderState;
pub use ratelimit_sms::{RateLimitSmsService, DEFAULT_LIMIT_KEY};
pub use template::Templates;
pub use timeout_failover_sms::TimeoutFailoverSmsService;

#[cfg(feature = "twilio-sms")]
pub use twilio::TwilioSmsService;

#[cfg(test)]
mod tests;
