//! Failover state shared by every concurrent sender of a provider chain

use std::sync::atomic::{AtomicU64, Ordering};

const FAILURES_MASK: u64 = 0xFFFF_FFFF;
const INDEX_SHIFT: u32 = 32;

/// Current provider index and consecutive timeout count, read together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub index: usize,
    pub failures: u64,
    raw: u64,
}

/// Rotation counter plus the breaker's provider index and timeout count.
///
/// Index and count live in one atomic word (index in the high half), so an
/// advance that moves the index and clears the count is a single
/// compare-and-swap. Chains hold it as `Arc<ProviderState>`; handing the
/// same `Arc` to several chains makes them rotate together.
#[derive(Debug, Default)]
pub struct ProviderState {
    sequence: AtomicU64,
    breaker: AtomicU64,
}

impl ProviderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next round-robin sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Sequence numbers handed out so far
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Snapshot {
        let raw = self.breaker.load(Ordering::SeqCst);
        Snapshot {
            index: (raw >> INDEX_SHIFT) as usize,
            failures: raw & FAILURES_MASK,
            raw,
        }
    }

    pub fn current_index(&self) -> usize {
        self.snapshot().index
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.snapshot().failures
    }

    /// Count one more timeout, returning the new total
    pub fn record_timeout(&self) -> u64 {
        let previous = self
            .breaker
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                if raw & FAILURES_MASK == FAILURES_MASK {
                    None
                } else {
                    Some(raw + 1)
                }
            })
            .unwrap_or_else(|raw| raw);
        ((previous & FAILURES_MASK) + 1).min(FAILURES_MASK)
    }

    pub fn record_success(&self) {
        self.breaker.fetch_and(!FAILURES_MASK, Ordering::SeqCst);
    }

    /// Move from the provider in `observed` to the next of `len` providers
    /// and clear the failure count.
    ///
    /// Succeeds only if nothing changed since `observed` was taken; the one
    /// caller that wins gets `true`. Losers should take a fresh
    /// [`ProviderState::snapshot`].
    pub fn try_advance(&self, observed: Snapshot, len: usize) -> bool {
        let next = ((observed.index + 1) % len.max(1)) as u64;
        self.breaker
            .compare_exchange(
                observed.raw,
                next << INDEX_SHIFT,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sequence_is_monotonic() {
        let state = ProviderState::new();
        assert_eq!(state.next_sequence(), 0);
        assert_eq!(state.next_sequence(), 1);
        assert_eq!(state.sequence(), 2);
    }

    #[test]
    fn test_timeouts_and_success() {
        let state = ProviderState::new();
        assert_eq!(state.record_timeout(), 1);
        assert_eq!(state.record_timeout(), 2);
        state.record_success();
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_advance_wraps_and_resets_failures() {
        let state = ProviderState::new();
        state.record_timeout();
        state.record_timeout();

        assert!(state.try_advance(state.snapshot(), 2));
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.consecutive_failures(), 0);

        // Success on the new provider keeps the index
        state.record_timeout();
        state.record_success();
        assert_eq!(state.current_index(), 1);

        assert!(state.try_advance(state.snapshot(), 2));
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_stale_snapshot_loses() {
        let state = ProviderState::new();
        let stale = state.snapshot();
        assert!(state.try_advance(stale, 3));
        state.record_timeout();

        assert!(!state.try_advance(stale, 3));
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.consecutive_failures(), 1);
    }

    #[test]
    fn test_concurrent_advance_has_one_winner() {
        let state = Arc::new(ProviderState::new());
        for _ in 0..4 {
            state.record_timeout();
        }
        let observed = state.snapshot();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || state.try_advance(observed, 3))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.consecutive_failures(), 0);
    }
}
