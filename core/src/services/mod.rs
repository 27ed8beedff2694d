//! Business services containing domain logic and use cases.

pub mod ratelimit;
pub mod sms;
pub mod verification;

// Re-export commonly used types
pub use ratelimit::LimiterTrait;
pub use sms::{SmsServiceTrait, TemplateArgs};
pub use verification::{
    CodeCacheTrait, CodeService, CodeServiceConfig, DynCodeService, SendCodeResult,
};
