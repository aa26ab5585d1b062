//! Concurrent, in-memory continuous limit-order-matching engine.
//!
//! Core components, leaves first:
//! - [`clock::Clock`] — strictly increasing nanosecond timestamps.
//! - [`order`] — `Order` / `Event` value records.
//! - [`book::PriceTimeBook`] — per-instrument, per-side price-time priority book.
//! - [`registry::InstrumentRegistry`] — lazy symbol -> (books, gate) mapping.
//! - [`gate::SideGate`] — same-side-parallel, cross-side-exclusive synchronization.
//! - [`matcher::Matcher`] — the matching algorithm and cancellation logic.
//! - [`session`] — one sequential command stream per client connection.
//!
//! Transport (how commands arrive and events leave) is deliberately abstract
//! here: see the `ClientConnection` / `OutputSink` traits in [`session`].
//! Concrete transports live in the `exchange-service` binary crate.

pub mod clock;
pub mod error;
pub mod gate;
pub mod book;
pub mod order;
pub mod registry;
pub mod matcher;
pub mod session;

pub use clock::Clock;
pub use error::fatal;
pub use gate::SideGate;
pub use book::PriceTimeBook;
pub use order::{Event, Order, OrderId, Side};
pub use registry::{Instrument, InstrumentRegistry};
pub use matcher::{Command, Matcher};
pub use session::{ClientConnection, OutputSink, ReadOutcome, Session};
