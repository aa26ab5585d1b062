//! Channel-backed implementations of `engine`'s `ClientConnection` and
//! `OutputSink` traits, plus the JSON wire format for ingress commands.

use engine::error::FrameError;
use engine::{ClientConnection, Command, Event, OutputSink, ReadOutcome};
use serde::Deserialize;
use std::sync::mpsc::Receiver;
use tokio::sync::mpsc::UnboundedSender;

/// One decoded command frame, as received over the WebSocket. Mirrors
/// `Command` but as a serde-friendly external representation — `cancel`
/// doesn't carry `instrument`/`price`/`count`, so those are optional here.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireCommand {
    Buy { order_id: u32, instrument: String, price: u32, count: u32 },
    Sell { order_id: u32, instrument: String, price: u32, count: u32 },
    Cancel { order_id: u32 },
}

impl From<WireCommand> for Command {
    fn from(wire: WireCommand) -> Self {
        match wire {
            WireCommand::Buy { order_id, instrument, price, count } => {
                Command::Buy { order_id, instrument, price, count }
            }
            WireCommand::Sell { order_id, instrument, price, count } => {
                Command::Sell { order_id, instrument, price, count }
            }
            WireCommand::Cancel { order_id } => Command::Cancel { order_id },
        }
    }
}

pub(crate) fn decode_command(text: &str) -> Option<Command> {
    serde_json::from_str::<WireCommand>(text).ok().map(Command::from)
}

/// The blocking side of the inbound channel: the `Session` thread calls
/// `read_command`, which blocks on `Receiver::recv` until the async reader
/// task sends the next frame or the connection drops.
pub struct ChannelConnection {
    rx: Receiver<String>,
}

impl ChannelConnection {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx }
    }
}

impl ClientConnection for ChannelConnection {
    fn read_command(&mut self) -> ReadOutcome {
        match self.rx.recv() {
            Ok(text) => match decode_command(&text) {
                Some(cmd) => ReadOutcome::Command(cmd),
                None => ReadOutcome::Error(FrameError::Malformed(text).to_string()),
            },
            Err(_) => ReadOutcome::Closed,
        }
    }
}

/// The blocking side of the outbound channel. `UnboundedSender::send` is
/// synchronous and never blocks, so calling it from the `Session` thread
/// inside the matcher's critical path is safe.
pub struct ChannelSink {
    tx: UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl OutputSink for ChannelSink {
    fn emit(&self, event: Event) {
        // A send error here means the writer task already exited (socket
        // closed); the event is simply dropped, matching the engine's
        // "sessions block on the sink" contract turning into "the sink is
        // gone, nothing more to deliver".
        let _ = self.tx.send(event);
    }
}
