//! Per-instrument, per-side price-time priority book.
//!
//! Grounded directly in the reference `PriceLevels` type: a `BTreeMap` of
//! price to a FIFO queue of orders resting at that price. Ordering within a
//! price level falls out of FIFO insertion order for free — every order
//! pushed later also rests later (its timestamp is strictly greater, since
//! `Clock::now()` is strictly increasing), so "earlier timestamp first"
//! within a level is just "earlier in the queue". That means the book never
//! has to compare timestamps directly; it only needs price as a sort key.

use crate::order::{Order, OrderId, Side};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

pub struct PriceTimeBook {
    side: Side,
    levels: BTreeMap<u32, VecDeque<Arc<Order>>>,
}

impl PriceTimeBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Places `order` at the back of its price level's FIFO queue. Caller
    /// must hold this book's write lock.
    pub fn insert(&mut self, order: Arc<Order>) {
        let price = order.price;
        self.prune_level(price);
        self.levels.entry(price).or_default().push_back(order);
    }

    /// Best-price-first, oldest-first iteration. Caller must hold (at
    /// least) this book's read lock for the duration of the iteration —
    /// same-side inserts may interleave with an in-progress read in another
    /// thread's iterator, but `BTreeMap`/`VecDeque` never invalidate a
    /// live shared borrow, so that's fine; it just means a fresh insert
    /// may or may not be observed by an iterator already underway.
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = &Arc<Order>> + '_> {
        match self.side {
            Side::Sell => Box::new(self.levels.iter().flat_map(|(_, q)| q.iter())),
            Side::Buy => Box::new(self.levels.iter().rev().flat_map(|(_, q)| q.iter())),
        }
    }

    /// Removes a specific order by id, wherever it sits. Not on the
    /// matching hot path (matching only ever skips exhausted orders
    /// lazily); provided so callers with write access can compact a book
    /// explicitly, e.g. in tests or maintenance tooling.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        let mut removed = false;
        self.levels.retain(|_, q| {
            let before = q.len();
            q.retain(|o| o.id != order_id);
            removed |= q.len() != before;
            !q.is_empty()
        });
        removed
    }

    pub fn best_price(&self) -> Option<u32> {
        match self.side {
            Side::Sell => self.levels.keys().next().copied(),
            Side::Buy => self.levels.keys().next_back().copied(),
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(|q| q.len()).sum()
    }

    /// Opportunistic lazy-deletion compaction (§4.3: "implementations may
    /// remove such orders opportunistically"). Only prunes the level a new
    /// order is about to join, since that's the one write-lock critical
    /// section insert already pays for — a full-book sweep would need to
    /// hold the write lock far longer than insertion otherwise requires.
    fn prune_level(&mut self, price: u32) {
        if let Some(q) = self.levels.get_mut(&price) {
            q.retain(|o| o.remaining() > 0);
            if q.is_empty() {
                self.levels.remove(&price);
            }
        }
    }
}
