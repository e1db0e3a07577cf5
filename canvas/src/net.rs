//! Reconnecting websocket connection for the browser build.
//!
//! One long-lived task per [`Connection`]: open, pump both directions until
//! either side fails, report `Disconnected`, back off, and try again until
//! [`Connection::teardown`]. The server resends a full history snapshot on
//! every connect, so the engine resyncs without anything stored here.

use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::{AbortHandle, Abortable};
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;
use wire::ClientMessage;

use crate::sync::{Backoff, ChannelTransport, ConnectionStatus, NetEvent, decode_bytes, decode_text};

/// Handle to the connection task. Dropping it tears the connection down.
pub struct Connection {
    abort: AbortHandle,
    transport: ChannelTransport,
}

impl Connection {
    /// Spawn the connection task for `url`.
    ///
    /// Returns the handle and the single stream of inbound events. Outbound
    /// messages go through [`Connection::transport`].
    #[must_use]
    pub fn connect(url: &str) -> (Self, UnboundedReceiver<NetEvent>) {
        let (transport, outbound) = ChannelTransport::new();
        let (events_tx, events_rx) = mpsc::unbounded();
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(connection_loop(url.to_owned(), outbound, events_tx), registration);
        wasm_bindgen_futures::spawn_local(async move {
            if task.await.is_err() {
                log::info!("connection torn down");
            }
        });
        (Self { abort, transport }, events_rx)
    }

    /// A transport feeding this connection. Clones share one queue.
    #[must_use]
    pub fn transport(&self) -> ChannelTransport {
        self.transport.clone()
    }

    /// Stop reconnecting and close the socket.
    pub fn teardown(&self) {
        self.abort.abort();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

async fn connection_loop(
    url: String,
    mut outbound: UnboundedReceiver<ClientMessage>,
    events: UnboundedSender<NetEvent>,
) {
    let mut backoff = Backoff::new();

    loop {
        emit(&events, NetEvent::ConnectionStateChanged(ConnectionStatus::Connecting));

        match run_session(&url, &mut outbound, &events).await {
            Ok(true) => {
                log::info!("websocket closed");
                backoff.reset();
            }
            Ok(false) => log::warn!("websocket closed before any message arrived"),
            Err(e) => log::warn!("websocket connect failed: {e}"),
        }

        if !emit(&events, NetEvent::ConnectionStateChanged(ConnectionStatus::Disconnected)) {
            log::info!("event consumer gone; stopping connection");
            return;
        }

        let delay = backoff.next_delay_ms();
        log::info!("reconnecting in {delay}ms");
        gloo_timers::future::sleep(Duration::from_millis(u64::from(delay))).await;
    }
}

/// Pump one socket until either direction ends. Returns whether the server
/// ever got a message through, which is what counts as a successful open.
async fn run_session(
    url: &str,
    outbound: &mut UnboundedReceiver<ClientMessage>,
    events: &UnboundedSender<NetEvent>,
) -> Result<bool, String> {
    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();

    // Strokes queued while offline are superseded by the snapshot this
    // connection is about to deliver.
    let mut stale = 0_usize;
    while outbound.try_recv().is_ok() {
        stale += 1;
    }
    if stale > 0 {
        log::info!("dropped {stale} strokes queued while offline");
    }

    let mut opened = false;

    let send_task = async {
        while let Some(message) = outbound.next().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    log::error!("failed to encode outbound message: {e}");
                    continue;
                }
            };
            if ws_write.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(frame) = ws_read.next().await {
            let decoded = match frame {
                Ok(Message::Text(text)) => decode_text(&text),
                Ok(Message::Bytes(bytes)) => decode_bytes(&bytes),
                Err(e) => {
                    log::warn!("websocket receive error: {e}");
                    break;
                }
            };
            let event = match decoded {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("dropping undecodable message: {e}");
                    continue;
                }
            };
            if !opened {
                opened = true;
                emit(events, NetEvent::ConnectionStateChanged(ConnectionStatus::Connected));
            }
            if !emit(events, event) {
                break;
            }
        }
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;
    Ok(opened)
}

/// Forward an event to the consumer. `false` once the consumer is gone.
fn emit(events: &UnboundedSender<NetEvent>, event: NetEvent) -> bool {
    events.unbounded_send(event).is_ok()
}
