//! Outbound message delivery capability

mod traits;

pub use traits::{SmsServiceTrait, TemplateArgs};
