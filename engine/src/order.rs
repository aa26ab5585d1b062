//! Order and output-event value types.
//!
//! The reference engine used a `BuyOrder`/`SellOrder` class hierarchy; a
//! single tagged `Order` is enough here, since the side only changes which
//! comparator a `PriceTimeBook` applies — it's a property of the book, not
//! the order (see DESIGN.md, "polymorphic orders").

use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub u32);

/// The mutable part of an order: remaining quantity and the per-order fill
/// counter. Both are guarded by the same lock since every mutation updates
/// them together (spec §3, invariant 3 and 4).
#[derive(Debug, Clone, Copy)]
pub struct OrderState {
    pub count: u32,
    pub exec_seq: u32,
}

/// A resting or in-flight order.
///
/// `price` and `side` never change after construction. `timestamp` is set
/// exactly once, at resting time, before the order becomes visible to any
/// other session or matcher (it is still inside the session that created it
/// up to that point) — once published into a book its `(price, timestamp)`
/// position is fixed (invariant 2).
#[derive(Debug)]
pub struct Order {
    pub id: OrderId,
    pub instrument: Arc<str>,
    pub side: Side,
    pub price: u32,
    timestamp: AtomicU64,
    state: Mutex<OrderState>,
}

impl Order {
    pub fn new(id: OrderId, instrument: Arc<str>, side: Side, price: u32, count: u32) -> Self {
        Self {
            id,
            instrument,
            side,
            price,
            timestamp: AtomicU64::new(0),
            state: Mutex::new(OrderState { count, exec_seq: 1 }),
        }
    }

    /// Locks the mutable state. Callers must hold this lock for the entire
    /// duration of a read-modify-write against `count`/`exec_seq` — see
    /// `Matcher` for the exact critical sections the spec requires.
    pub fn lock(&self) -> MutexGuard<'_, OrderState> {
        self.state.lock()
    }

    pub fn remaining(&self) -> u32 {
        self.state.lock().count
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp.load(Ordering::Acquire)
    }

    /// Adopts a fresh resting timestamp. Called exactly once, immediately
    /// before the order is inserted into its own side's book.
    pub fn set_timestamp(&self, ts: u64) {
        self.timestamp.store(ts, Ordering::Release);
    }
}

/// One output event, as described in §6 (Egress) of the spec. Each variant
/// maps to one of the three atomic emitters the sink exposes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Added {
        order_id: u32,
        instrument: String,
        price: u32,
        count: u32,
        is_sell_side: bool,
        timestamp: u64,
    },
    Executed {
        resting_order_id: u32,
        aggressor_order_id: u32,
        resting_exec_seq: u32,
        price: u32,
        count: u32,
        timestamp: u64,
    },
    Deleted {
        order_id: u32,
        accepted: bool,
        timestamp: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_seq_starts_at_one() {
        let o = Order::new(OrderId(1), Arc::from("AAPL"), Side::Buy, 100, 10);
        assert_eq!(o.lock().exec_seq, 1);
    }

    #[test]
    fn timestamp_unset_until_rested() {
        let o = Order::new(OrderId(1), Arc::from("AAPL"), Side::Buy, 100, 10);
        assert_eq!(o.timestamp(), 0);
        o.set_timestamp(42);
        assert_eq!(o.timestamp(), 42);
    }
}
