//! Read-only introspection helpers over the engine's `InstrumentRegistry`.
//!
//! These never go through the `Matcher` and carry none of the core's
//! ordering guarantees (§12) — they exist so the retained REST surface has
//! something to serve without duplicating state the engine already owns.

use engine::InstrumentRegistry;
use std::sync::Arc;

use crate::types::{MarketDepth, PriceLevel};

pub struct Introspection {
    registry: Arc<InstrumentRegistry>,
}

impl Introspection {
    pub fn new(registry: Arc<InstrumentRegistry>) -> Self {
        Self { registry }
    }

    pub fn list_symbols(&self) -> Vec<String> {
        self.registry.symbols().iter().map(|s| s.to_string()).collect()
    }

    /// Known symbol check without creating one — unlike `InstrumentRegistry::get`,
    /// this must not have the side effect of lazily materializing `symbol`.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.registry.symbols().iter().any(|s| s.as_ref() == symbol)
    }

    pub fn market_depth(&self, symbol: &str, levels: usize) -> Option<MarketDepth> {
        if !self.has_symbol(symbol) {
            return None;
        }
        let instr = self.registry.get(symbol);

        let bids = group_by_price(instr.bids.read().iter_best_first().map(|o| (o.price, o.remaining())))
            .into_iter()
            .take(levels)
            .collect();
        let asks = group_by_price(instr.asks.read().iter_best_first().map(|o| (o.price, o.remaining())))
            .into_iter()
            .take(levels)
            .collect();

        Some(MarketDepth { symbol: symbol.to_string(), bids, asks })
    }
}

/// `iter_best_first` is already grouped by price (best-first); this just
/// collapses consecutive same-price entries into one level, dropping
/// exhausted (remaining == 0) orders along the way.
fn group_by_price(orders: impl Iterator<Item = (u32, u32)>) -> Vec<PriceLevel> {
    let mut levels: Vec<PriceLevel> = Vec::new();
    for (price, remaining) in orders.filter(|(_, r)| *r > 0) {
        match levels.last_mut() {
            Some(last) if last.price == price => last.order_count += 1,
            _ => levels.push(PriceLevel { price, order_count: 1 }),
        }
    }
    levels
}
