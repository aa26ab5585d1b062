//! The matching algorithm: `submit_buy`, `submit_sell`, `cancel`.
//!
//! Transcribed from the reference `match_buy`/`match_sell`/`cancel_order`,
//! generalized from the instrument-keyed mutex maps there into the
//! `InstrumentRegistry` + `SideGate` pair. The locking order the spec
//! mandates (gate, then book, then per-order lock, released before the next
//! candidate) is preserved exactly.

use crate::order::{Event, Order, OrderId, Side};
use crate::registry::InstrumentRegistry;
use crate::Clock;
use std::sync::Arc;
use tracing::trace;

/// One decoded ingress command (§6). `instrument`/`price`/`count` are
/// unused for `Cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Buy {
        order_id: u32,
        instrument: String,
        price: u32,
        count: u32,
    },
    Sell {
        order_id: u32,
        instrument: String,
        price: u32,
        count: u32,
    },
    Cancel {
        order_id: u32,
    },
}

pub struct Matcher {
    registry: Arc<InstrumentRegistry>,
    clock: Arc<Clock>,
}

impl Matcher {
    pub fn new(registry: Arc<InstrumentRegistry>, clock: Arc<Clock>) -> Self {
        Self { registry, clock }
    }

    pub fn registry(&self) -> &Arc<InstrumentRegistry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<Clock> {
        &self.clock
    }

    /// §4.5.1. Returns the aggressor (for the session's local order table,
    /// so a later cancel can find it whether or not it rested) and the
    /// events to emit, already in the spec-mandated order: `Added` (if any)
    /// before the captured `Executed`s.
    pub fn submit_buy(
        &self,
        order_id: OrderId,
        instrument: &str,
        price: u32,
        count: u32,
    ) -> (Arc<Order>, Vec<Event>) {
        let aggressor = Arc::new(Order::new(order_id, Arc::from(instrument), Side::Buy, price, count));
        let instr = self.registry.get(instrument);

        instr.gate.enter_buy();

        let mut fills = Vec::new();
        {
            let asks = instr.asks.read();
            for resting in asks.iter_best_first() {
                let mut resting_state = resting.lock();
                let aggressor_remaining = aggressor.lock().count;

                if aggressor_remaining == 0 || resting.price > price {
                    break;
                }
                if resting_state.count == 0 {
                    continue;
                }

                let delta = resting_state.count.min(aggressor_remaining);
                resting_state.count -= delta;
                aggressor.lock().count -= delta;
                let seq = resting_state.exec_seq;
                resting_state.exec_seq += 1;
                let ts = self.clock.now();
                drop(resting_state);

                trace!(
                    resting_order_id = resting.id.0,
                    aggressor_order_id = aggressor.id.0,
                    resting_exec_seq = seq,
                    price = resting.price,
                    count = delta,
                    "execution leg"
                );

                fills.push(Event::Executed {
                    resting_order_id: resting.id.0,
                    aggressor_order_id: aggressor.id.0,
                    resting_exec_seq: seq,
                    price: resting.price,
                    count: delta,
                    timestamp: ts,
                });
            }
        }

        let mut events = Vec::with_capacity(fills.len() + 1);
        let remaining = aggressor.lock().count;
        if remaining > 0 {
            let ts = self.clock.now();
            aggressor.set_timestamp(ts);
            instr.bids.write().insert(aggressor.clone());
            events.push(Event::Added {
                order_id: aggressor.id.0,
                instrument: aggressor.instrument.to_string(),
                price: aggressor.price,
                count: remaining,
                is_sell_side: false,
                timestamp: ts,
            });
        }

        instr.gate.leave_buy();

        events.extend(fills);
        (aggressor, events)
    }

    /// §4.5.2, symmetric to `submit_buy`: crosses while `resting.price <
    /// aggressor.price`, rests on the ask book.
    pub fn submit_sell(
        &self,
        order_id: OrderId,
        instrument: &str,
        price: u32,
        count: u32,
    ) -> (Arc<Order>, Vec<Event>) {
        let aggressor = Arc::new(Order::new(order_id, Arc::from(instrument), Side::Sell, price, count));
        let instr = self.registry.get(instrument);

        instr.gate.enter_sell();

        let mut fills = Vec::new();
        {
            let bids = instr.bids.read();
            for resting in bids.iter_best_first() {
                let mut resting_state = resting.lock();
                let aggressor_remaining = aggressor.lock().count;

                if aggressor_remaining == 0 || resting.price < price {
                    break;
                }
                if resting_state.count == 0 {
                    continue;
                }

                let delta = resting_state.count.min(aggressor_remaining);
                resting_state.count -= delta;
                aggressor.lock().count -= delta;
                let seq = resting_state.exec_seq;
                resting_state.exec_seq += 1;
                let ts = self.clock.now();
                drop(resting_state);

                trace!(
                    resting_order_id = resting.id.0,
                    aggressor_order_id = aggressor.id.0,
                    resting_exec_seq = seq,
                    price = resting.price,
                    count = delta,
                    "execution leg"
                );

                fills.push(Event::Executed {
                    resting_order_id: resting.id.0,
                    aggressor_order_id: aggressor.id.0,
                    resting_exec_seq: seq,
                    price: resting.price,
                    count: delta,
                    timestamp: ts,
                });
            }
        }

        let mut events = Vec::with_capacity(fills.len() + 1);
        let remaining = aggressor.lock().count;
        if remaining > 0 {
            let ts = self.clock.now();
            aggressor.set_timestamp(ts);
            instr.asks.write().insert(aggressor.clone());
            events.push(Event::Added {
                order_id: aggressor.id.0,
                instrument: aggressor.instrument.to_string(),
                price: aggressor.price,
                count: remaining,
                is_sell_side: true,
                timestamp: ts,
            });
        }

        instr.gate.leave_sell();

        events.extend(fills);
        (aggressor, events)
    }

    /// §4.5.3. The side-gate is deliberately *not* taken here — the
    /// per-order lock alone is sufficient, since any matcher that reaches
    /// this order will take the same lock before reading or decrementing
    /// `count`.
    pub fn cancel(&self, order: &Arc<Order>) -> Event {
        let mut state = order.lock();
        let accepted = state.count > 0;
        state.count = 0;
        drop(state);

        Event::Deleted {
            order_id: order.id.0,
            accepted,
            timestamp: self.clock.now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> Matcher {
        Matcher::new(Arc::new(InstrumentRegistry::new()), Arc::new(Clock::new()))
    }

    #[test]
    fn trivial_cross() {
        let m = matcher();
        let (_buy, events) = m.submit_buy(OrderId(1), "AAPL", 100, 10);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::Added { order_id: 1, price: 100, count: 10, is_sell_side: false, .. }
        ));
        if let Event::Added { ref instrument, .. } = events[0] {
            assert_eq!(instrument, "AAPL");
        }

        let (_sell, events) = m.submit_sell(OrderId(2), "AAPL", 100, 10);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Executed {
                resting_order_id,
                aggressor_order_id,
                resting_exec_seq,
                price,
                count,
                ..
            } => {
                assert_eq!(*resting_order_id, 1);
                assert_eq!(*aggressor_order_id, 2);
                assert_eq!(*resting_exec_seq, 1);
                assert_eq!(*price, 100);
                assert_eq!(*count, 10);
            }
            other => panic!("expected Executed, got {other:?}"),
        }
    }

    #[test]
    fn partial_fill_aggressor_rests() {
        let m = matcher();
        let (_sell, added) = m.submit_sell(OrderId(1), "AAPL", 100, 5);
        assert_eq!(added.len(), 1);

        let (buy, events) = m.submit_buy(OrderId(2), "AAPL", 100, 10);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Added { order_id: 2, count: 5, is_sell_side: false, .. }));
        assert!(matches!(events[1], Event::Executed { resting_order_id: 1, aggressor_order_id: 2, count: 5, .. }));
        assert_eq!(buy.remaining(), 5);
    }

    #[test]
    fn price_time_priority_same_price_different_resting_orders() {
        let m = matcher();
        m.submit_buy(OrderId(1), "AAPL", 100, 5);
        m.submit_buy(OrderId(2), "AAPL", 100, 5);
        let (_sell, events) = m.submit_sell(OrderId(3), "AAPL", 100, 10);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Executed { resting_order_id: 1, resting_exec_seq: 1, count: 5, .. }));
        assert!(matches!(events[1], Event::Executed { resting_order_id: 2, resting_exec_seq: 1, count: 5, .. }));
    }

    #[test]
    fn cancel_before_match_then_no_execution() {
        let m = matcher();
        let (buy, _) = m.submit_buy(OrderId(1), "AAPL", 100, 10);
        let deleted = m.cancel(&buy);
        assert!(matches!(deleted, Event::Deleted { order_id: 1, accepted: true, .. }));

        let (_sell, events) = m.submit_sell(OrderId(2), "AAPL", 100, 10);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::Added { order_id: 2, is_sell_side: true, count: 10, .. }));
    }

    #[test]
    fn cancel_after_full_fill_is_not_accepted() {
        let m = matcher();
        let (buy, _) = m.submit_buy(OrderId(1), "AAPL", 100, 10);
        let (_sell, fills) = m.submit_sell(OrderId(2), "AAPL", 100, 10);
        assert_eq!(fills.len(), 1);

        let deleted = m.cancel(&buy);
        assert!(matches!(deleted, Event::Deleted { order_id: 1, accepted: false, .. }));
    }

    #[test]
    fn exec_seq_enumeration_across_many_aggressors() {
        // One resting buy with enough size to absorb four separate partial
        // fills, each from its own aggressor; a fifth aggressor then finds
        // the book empty and rests. exec_seq against id=1 must come back
        // as 1,2,3,4 in arrival order.
        let m = matcher();
        let (buy, _) = m.submit_buy(OrderId(1), "AAPL", 100, 10);

        for (id, expected_seq) in [(2u32, 1u32), (3, 2), (4, 3), (5, 4)] {
            let (_sell, events) = m.submit_sell(OrderId(id), "AAPL", 100, 2);
            assert_eq!(events.len(), 1);
            assert!(matches!(
                events[0],
                Event::Executed { resting_order_id: 1, resting_exec_seq, count: 2, .. }
                    if resting_exec_seq == expected_seq
            ));
        }
        assert_eq!(buy.remaining(), 2);

        let (_sell, events) = m.submit_sell(OrderId(6), "AAPL", 100, 2);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::Executed { resting_order_id: 1, resting_exec_seq: 5, count: 2, .. }
        ));
        assert_eq!(buy.remaining(), 0);

        let (_sell, events) = m.submit_sell(OrderId(7), "AAPL", 100, 20);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::Added { order_id: 7, count: 20, is_sell_side: true, .. }
        ));
    }

    #[test]
    fn crossing_price_rule_executed_price_is_resting_price() {
        let m = matcher();
        m.submit_sell(OrderId(1), "AAPL", 95, 10);
        let (_buy, events) = m.submit_buy(OrderId(2), "AAPL", 100, 10);
        match &events[0] {
            Event::Executed { price, .. } => assert_eq!(*price, 95),
            other => panic!("expected Executed, got {other:?}"),
        }
    }
}
