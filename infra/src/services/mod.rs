//! Services module - Infrastructure service implementations

/// Sliding-window rate limiters
pub mod ratelimit;

pub use ratelimit::{LocalSlidingWindowLimiter, RedisSlidingWindowLimiter};
