//! Sliding-window rate limiting capability

mod traits;

pub use traits::LimiterTrait;
