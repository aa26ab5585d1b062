//! Per-instrument side gate: same-side aggressors run in parallel, opposite
//! sides are mutually exclusive.
//!
//! This is a direct translation of the reference `BuySellMutex`/`CounterMutex`
//! pair. A plain `RwLock` won't do — both buy and sell aggressors *mutate*
//! the books (that's what makes them both "writers" in RwLock terms), but we
//! specifically want same-side writers to run concurrently with each other,
//! which an RwLock has no vocabulary for. So instead: two counters, each
//! under its own small lock, plus one binary mutex `M` that only the first
//! arrival on a side takes and only the last departure releases.
use lock_api::RawMutex as _;
use parking_lot::{Mutex, RawMutex};

pub struct SideGate {
    buy_count: Mutex<u32>,
    sell_count: Mutex<u32>,
    m: RawMutex,
}

impl SideGate {
    pub fn new() -> Self {
        Self {
            buy_count: Mutex::new(0),
            sell_count: Mutex::new(0),
            m: RawMutex::INIT,
        }
    }

    pub fn enter_buy(&self) {
        let mut count = self.buy_count.lock();
        *count += 1;
        if *count == 1 {
            self.m.lock();
        }
    }

    pub fn leave_buy(&self) {
        let mut count = self.buy_count.lock();
        *count -= 1;
        if *count == 0 {
            unsafe { self.m.unlock() };
        }
    }

    pub fn enter_sell(&self) {
        let mut count = self.sell_count.lock();
        *count += 1;
        if *count == 1 {
            self.m.lock();
        }
    }

    pub fn leave_sell(&self) {
        let mut count = self.sell_count.lock();
        *count -= 1;
        if *count == 0 {
            unsafe { self.m.unlock() };
        }
    }
}

impl Default for SideGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_side_runs_concurrently() {
        let gate = Arc::new(SideGate::new());
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            let concurrent = concurrent.clone();
            let max_seen = max_seen.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                gate.enter_buy();
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                concurrent.fetch_sub(1, Ordering::SeqCst);
                gate.leave_buy();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(max_seen.load(Ordering::SeqCst) > 1, "buy side should overlap");
    }

    #[test]
    fn opposite_sides_are_exclusive() {
        let gate = Arc::new(SideGate::new());
        let buy_active = Arc::new(AtomicBool::new(false));
        let violation = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::new();
        for i in 0..50 {
            let gate = gate.clone();
            let buy_active = buy_active.clone();
            let violation = violation.clone();
            handles.push(thread::spawn(move || {
                if i % 2 == 0 {
                    gate.enter_buy();
                    buy_active.store(true, Ordering::SeqCst);
                    thread::sleep(Duration::from_micros(200));
                    buy_active.store(false, Ordering::SeqCst);
                    gate.leave_buy();
                } else {
                    gate.enter_sell();
                    if buy_active.load(Ordering::SeqCst) {
                        violation.store(true, Ordering::SeqCst);
                    }
                    gate.leave_sell();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(!violation.load(Ordering::SeqCst), "buy and sell overlapped");
    }
}
