//! Bridges one Axum WebSocket connection to one blocking [`Session`].
//!
//! The engine's matching core is purely blocking (§5 of the design: "no
//! suspension points inside matching"), but the WebSocket itself is async
//! I/O on the Tokio runtime. A `Session` therefore runs on its own
//! `spawn_blocking` task — mirroring the reference engine's one-thread-per-
//! connection model — fed by a plain `std::sync::mpsc` channel for inbound
//! frames (the async reader task `send`s without blocking; the `Session`
//! thread blocks on `recv`) and draining to a `tokio::sync::mpsc`
//! unbounded sender for outbound events (its `send` is synchronous and
//! non-blocking, so it's safe to call from the `Session` thread; the async
//! writer task `await`s `recv` and forwards each event as one WebSocket
//! text frame).

use axum::extract::ws::{Message, WebSocket};
use engine::{Event, Matcher, Session};
use futures::{SinkExt, StreamExt};
use std::sync::mpsc as blocking_mpsc;
use std::sync::Arc;
use tokio::sync::mpsc as async_mpsc;
use tracing::{debug, info, warn};

use crate::session::{ChannelConnection, ChannelSink};

/// Drives one accepted WebSocket end to end: spawns the blocking `Session`
/// thread, then pumps frames between the socket and its channels until
/// either side closes.
pub async fn handle_connection(socket: WebSocket, matcher: Arc<Matcher>) {
    info!("session connected");

    let (inbound_tx, inbound_rx) = blocking_mpsc::channel::<String>();
    let (outbound_tx, mut outbound_rx) = async_mpsc::unbounded_channel::<Event>();

    let conn = ChannelConnection::new(inbound_rx);
    let sink = Arc::new(ChannelSink::new(outbound_tx));
    let session = Session::new(matcher, conn, sink);

    let session_handle = tokio::task::spawn_blocking(move || session.run());

    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "failed to encode outbound event"),
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!("received command frame");
                if inbound_tx.send(text).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Binary(_)) => {}
            Err(err) => {
                warn!(%err, "websocket read error, terminating session");
                break;
            }
        }
    }

    // Dropping `inbound_tx` unblocks the Session thread's next `recv()`
    // with a disconnect, which `ChannelConnection` reports as `Closed`.
    drop(inbound_tx);
    let _ = session_handle.await;
    writer.abort();

    info!("session disconnected");
}
