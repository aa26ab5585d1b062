//! Per-connection command dispatch loop.
//!
//! One `Session` maps to one client connection and runs on its own thread —
//! the reference engine detaches a `std::thread` per accepted socket and
//! blocks it on `read()`/`recv()` for the life of the connection; a `Session`
//! here plays that same role but is abstracted over how bytes actually
//! arrive and leave, so the blocking engine never has to know it's sitting
//! behind an async WebSocket.

use crate::matcher::{Command, Matcher};
use crate::order::{Event, Order, OrderId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The result of one read attempt against a client connection.
pub enum ReadOutcome {
    /// A fully decoded command, ready to dispatch.
    Command(Command),
    /// The peer closed the connection cleanly (EOF). The session ends
    /// without logging anything — this is the expected, quiet case.
    Closed,
    /// The read failed or the frame didn't decode. Distinct from `Closed`:
    /// the reference engine's read-error path fell through ambiguously;
    /// here it is unambiguous — log at `warn` and end the session.
    Error(String),
}

/// Blocking source of inbound commands for one session.
pub trait ClientConnection {
    fn read_command(&mut self) -> ReadOutcome;
}

/// Sink for outbound events for one session. `emit` must not block on
/// anything the matching path could be waiting on — implementations that
/// bridge to an async transport should hand off via a non-blocking channel
/// send (see exchange-service's transport bridge).
pub trait OutputSink {
    fn emit(&self, event: Event);
}

/// Runs one client's command stream against a shared `Matcher`.
///
/// Commands from a single session are processed strictly in arrival order
/// (§5: "a session's own commands execute in the order it sent them"); there
/// is no internal buffering or reordering here, only whatever the
/// `ClientConnection` hands back one call at a time.
pub struct Session<C: ClientConnection, S: OutputSink> {
    matcher: Arc<Matcher>,
    conn: C,
    sink: Arc<S>,
    orders: HashMap<u32, Arc<Order>>,
}

impl<C: ClientConnection, S: OutputSink> Session<C, S> {
    pub fn new(matcher: Arc<Matcher>, conn: C, sink: Arc<S>) -> Self {
        Self {
            matcher,
            conn,
            sink,
            orders: HashMap::new(),
        }
    }

    /// Drives the session to completion: reads and dispatches commands one
    /// at a time until the connection closes or errors.
    pub fn run(mut self) {
        loop {
            match self.conn.read_command() {
                ReadOutcome::Command(cmd) => self.dispatch(cmd),
                ReadOutcome::Closed => break,
                ReadOutcome::Error(reason) => {
                    warn!(reason, "session read failed, terminating connection");
                    break;
                }
            }
        }
    }

    fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Buy { order_id, instrument, price, count } => {
                let (order, events) = self.matcher.submit_buy(OrderId(order_id), &instrument, price, count);
                // Retained unconditionally: a later cancel must still be
                // able to resolve even if the order fully filled just now.
                self.orders.insert(order_id, order);
                self.emit_all(events);
            }
            Command::Sell { order_id, instrument, price, count } => {
                let (order, events) = self.matcher.submit_sell(OrderId(order_id), &instrument, price, count);
                self.orders.insert(order_id, order);
                self.emit_all(events);
            }
            Command::Cancel { order_id } => {
                match self.orders.get(&order_id) {
                    Some(order) => {
                        let event = self.matcher.cancel(order);
                        self.sink.emit(event);
                    }
                    None => {
                        debug!(order_id, "cancel referenced an unknown order id for this session");
                    }
                }
            }
        }
    }

    fn emit_all(&self, events: Vec<Event>) {
        for event in events {
            self.sink.emit(event);
        }
    }
}
