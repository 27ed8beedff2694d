//! In-process sliding-window limiter

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use cg_core::{Context, LimitError, LimiterTrait};
use cg_shared::RateLimitConfig;

/// Admission instants per key, plus when idle keys were last dropped
struct Windows {
    admitted: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl Windows {
    /// Drop every key with no admission inside the window. Runs at most
    /// once per window, so the map only holds keys active in the last two
    /// windows.
    fn sweep(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.last_sweep) < window {
            return;
        }
        self.admitted.retain(|_, instants| {
            instants
                .back()
                .map_or(false, |newest| now.duration_since(*newest) < window)
        });
        self.last_sweep = now;
    }
}

/// Sliding-window limiter local to this process
pub struct LocalSlidingWindowLimiter {
    windows: Mutex<Windows>,
    window: Duration,
    quota: u32,
}

impl LocalSlidingWindowLimiter {
    pub fn new(window: Duration, quota: u32) -> Self {
        Self {
            windows: Mutex::new(Windows {
                admitted: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            window,
            quota,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.window(), config.quota)
    }

    /// Keys currently holding window state
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .map(|windows| windows.admitted.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl LimiterTrait for LocalSlidingWindowLimiter {
    async fn limit(&self, ctx: &Context, key: &str) -> Result<bool, LimitError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| LimitError::backend("local limiter lock poisoned"))?;
        windows.sweep(now, self.window);

        if self.quota == 0 {
            return Ok(true);
        }

        let admitted = windows.admitted.entry(key.to_string()).or_default();
        while let Some(front) = admitted.front() {
            if now.duration_since(*front) >= self.window {
                admitted.pop_front();
            } else {
                break;
            }
        }

        if admitted.len() >= self.quota as usize {
            return Ok(true);
        }
        admitted.push_back(now);
        Ok(false)
    }
}
