//! Wire types for the retained REST introspection surface.
//!
//! These endpoints read `InstrumentRegistry`/`PriceTimeBook` state directly
//! and never go through the `Matcher`, so they carry none of the core's
//! ordering guarantees — they exist purely for operational visibility.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepthQuery {
    pub levels: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: u32,
    pub order_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarketDepth {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}
