//! Nonce supply.
//!
//! Nonces are owned by the caller. This module offers a source that hands out
//! unique, strictly increasing millisecond timestamps, with the clock injected
//! so tests stay deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock before 1970 yields 0 and the counter still advances
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Anything that can hand out the next nonce.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Strictly increasing nonces that follow the clock.
///
/// Each nonce is `max(previous + 1, clock_ms)`, so nonces never repeat even
/// when many are drawn within one millisecond or the clock steps backwards.
pub struct MonotonicNonces<C: Clock> {
    last: AtomicU64,
    clock: C,
}

impl<C: Clock> MonotonicNonces<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock,
        }
    }

    /// Never issue a nonce at or below `min_ms` again, e.g. after observing
    /// the exchange's clock running ahead of ours.
    pub fn observe(&self, min_ms: u64) {
        self.last.fetch_max(min_ms, Ordering::AcqRel);
    }

    /// Last nonce issued, 0 before the first.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

impl MonotonicNonces<SystemClock> {
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> NonceSource for MonotonicNonces<C> {
    fn next_nonce(&self) -> u64 {
        let now = self.clock.now_ms();
        let mut current = self.last.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(1).max(now);
            match self.last.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    /// Mock clock for testing with controllable time.
    struct MockClock {
        time_ms: AtomicU64,
    }

    impl MockClock {
        fn new(initial_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                time_ms: AtomicU64::new(initial_ms),
            })
        }

        fn set(&self, time_ms: u64) {
            self.time_ms.store(time_ms, Ordering::Release);
        }
    }

    impl Clock for Arc<MockClock> {
        fn now_ms(&self) -> u64 {
            self.time_ms.load(Ordering::Acquire)
        }
    }

    const BASE_TIME: u64 = 1_700_000_000_000;

    #[test]
    fn test_first_nonce_is_clock_time() {
        let nonces = MonotonicNonces::new(MockClock::new(BASE_TIME));
        assert_eq!(nonces.next_nonce(), BASE_TIME);
        assert_eq!(nonces.last(), BASE_TIME);
    }

    #[test]
    fn test_same_millisecond_still_increases() {
        let nonces = MonotonicNonces::new(MockClock::new(BASE_TIME));
        let drawn: Vec<u64> = (0..5).map(|_| nonces.next_nonce()).collect();
        assert_eq!(
            drawn,
            [BASE_TIME, BASE_TIME + 1, BASE_TIME + 2, BASE_TIME + 3, BASE_TIME + 4]
        );
    }

    #[test]
    fn test_clock_regression_no_decrease() {
        let clock = MockClock::new(BASE_TIME);
        let nonces = MonotonicNonces::new(Arc::clone(&clock));

        let before = nonces.next_nonce();
        clock.set(BASE_TIME - 10_000);
        let after = nonces.next_nonce();

        assert!(after > before, "nonce must not decrease when clock regresses");
    }

    #[test]
    fn test_follows_clock_forward() {
        let clock = MockClock::new(BASE_TIME);
        let nonces = MonotonicNonces::new(Arc::clone(&clock));

        nonces.next_nonce();
        clock.set(BASE_TIME + 5_000);
        assert_eq!(nonces.next_nonce(), BASE_TIME + 5_000);
    }

    #[test]
    fn test_observe_fast_forwards() {
        let nonces = MonotonicNonces::new(MockClock::new(BASE_TIME));
        nonces.observe(BASE_TIME + 1_000);
        assert_eq!(nonces.next_nonce(), BASE_TIME + 1_001);

        // Observing an older time does nothing
        nonces.observe(BASE_TIME);
        assert_eq!(nonces.next_nonce(), BASE_TIME + 1_002);
    }

    #[test]
    fn test_concurrent_no_duplicates() {
        let nonces = Arc::new(MonotonicNonces::new(MockClock::new(BASE_TIME)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let nonces = Arc::clone(&nonces);
                thread::spawn(move || (0..1000).map(|_| nonces.next_nonce()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        let total = all.len();
        all.dedup();

        assert_eq!(all.len(), total, "all nonces must be unique across threads");
    }
}
