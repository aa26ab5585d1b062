//! Lazy, thread-safe instrument registry.
//!
//! Grounded in the reference `Exchange`'s `DashMap<String, RwLock<OrderBook>>`:
//! `DashMap` gives the "lock-free in the common already-exists path" the
//! spec asks for (it shards internally, so a read on one symbol never
//! contends with a write on another), and the per-side books are each
//! behind their own `parking_lot::RwLock` instead of `tokio`'s async one —
//! matching is required to block, never suspend (§5).

use crate::book::PriceTimeBook;
use crate::gate::SideGate;
use crate::order::Side;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// The pair of books and the side-gate for one instrument. Created once,
/// lazily, and lives for the rest of the process (instruments are never
/// torn down).
pub struct Instrument {
    pub bids: RwLock<PriceTimeBook>,
    pub asks: RwLock<PriceTimeBook>,
    pub gate: SideGate,
}

impl Instrument {
    fn new() -> Self {
        Self {
            bids: RwLock::new(PriceTimeBook::new(Side::Buy)),
            asks: RwLock::new(PriceTimeBook::new(Side::Sell)),
            gate: SideGate::new(),
        }
    }
}

pub struct InstrumentRegistry {
    instruments: DashMap<Arc<str>, Arc<Instrument>>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self {
            instruments: DashMap::new(),
        }
    }

    /// Returns the stable `(bids, asks, gate)` tuple for `symbol`, creating
    /// it on first use. Concurrent callers racing on the same new symbol
    /// all observe the same `Arc<Instrument>` — `DashMap::entry` resolves
    /// the race under that shard's lock.
    pub fn get(&self, symbol: &str) -> Arc<Instrument> {
        if let Some(existing) = self.instruments.get(symbol) {
            return existing.clone();
        }
        self.instruments
            .entry(Arc::from(symbol))
            .or_insert_with(|| {
                tracing::debug!(symbol, "creating new instrument");
                Arc::new(Instrument::new())
            })
            .clone()
    }

    /// Eagerly creates `symbol`'s books if they don't already exist. Purely
    /// a startup convenience (§10 `preload_instruments`); does not change
    /// the lazy-creation contract for any other symbol.
    pub fn preload(&self, symbol: &str) {
        self.get(symbol);
    }

    pub fn symbols(&self) -> Vec<Arc<str>> {
        self.instruments.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
