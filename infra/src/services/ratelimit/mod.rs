//! Sliding-window rate limiters
//!
//! Both variants admit a request iff fewer than `quota` requests were
//! admitted for the same key within the trailing window, and record the
//! admitted request in the same atomic step.

mod local_limiter;
mod redis_limiter;


pub use local_limiter::LocalSlidingWindowLimiter;
pub use redis_limiter::RedisSlidingWindowLimiter;
