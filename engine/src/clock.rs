//! Monotonic, strictly-increasing nanosecond clock.
//!
//! `Instant` alone isn't quite enough: on some platforms two back-to-back
//! calls can observe the same tick. The `PriceTimeBook` tie-break (§4.1 of
//! the spec) depends on `now()` never returning the same value twice, so we
//! fold a process-wide counter into the measurement whenever the raw clock
//! doesn't move.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Strictly-increasing nanosecond timestamp source, shared across an
/// `Engine` instance.
pub struct Clock {
    epoch: Instant,
    last: AtomicU64,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last: AtomicU64::new(0),
        }
    }

    /// Returns a timestamp in nanoseconds, guaranteed strictly greater than
    /// every value this clock has returned before.
    pub fn now(&self) -> u64 {
        let raw = self.epoch.elapsed().as_nanos() as u64;
        loop {
            let last = self.last.load(Ordering::Acquire);
            let candidate = if raw > last { raw } else { last + 1 };
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(_) => continue,
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn strictly_increasing_single_threaded() {
        let clock = Clock::new();
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next > prev, "clock must strictly increase");
            prev = next;
        }
    }

    #[test]
    fn strictly_increasing_under_contention() {
        let clock = Arc::new(Clock::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let clock = clock.clone();
            handles.push(thread::spawn(move || {
                let mut stamps = Vec::with_capacity(2_000);
                for _ in 0..2_000 {
                    stamps.push(clock.now());
                }
                stamps
            }));
        }

        let mut all = HashSet::new();
        for h in handles {
            for ts in h.join().unwrap() {
                assert!(all.insert(ts), "duplicate timestamp observed: {ts}");
            }
        }
    }
}
