//! Stroke sync: the network boundary as seen by the engine.
//!
//! Inbound traffic arrives as a single stream of [`NetEvent`]s. Outbound
//! strokes go through the [`Transport`] injected into the engine. Local
//! gestures turn into strokes through a [`StrokeSampler`], which throttles by
//! distance and time so redraw and message rates stay bounded.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::Serialize;
use wire::{ClientMessage, CodecError, ServerMessage, Stroke};

use crate::camera::Point;
use crate::consts::{RECONNECT_INITIAL_MS, RECONNECT_MAX_MS, SAMPLE_MIN_DISTANCE, SAMPLE_MIN_INTERVAL_MS};

/// Connection lifecycle as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything the network can tell the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    /// Authoritative full history. Replaces all local state.
    HistorySnapshot(Vec<Stroke>),
    /// One stroke from another client.
    StrokeAppended(Stroke),
    ConnectionStateChanged(ConnectionStatus),
}

impl From<ServerMessage> for NetEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::HistorySnapshot { strokes } => Self::HistorySnapshot(strokes),
            ServerMessage::Stroke(stroke) => Self::StrokeAppended(stroke),
        }
    }
}

/// Decode a text frame from the server.
///
/// # Errors
///
/// Returns [`CodecError`] when the frame is not a known server message.
pub fn decode_text(text: &str) -> Result<NetEvent, CodecError> {
    ServerMessage::from_json(text).map(NetEvent::from)
}

/// Decode a binary frame from the server.
///
/// # Errors
///
/// Returns [`CodecError`] when the frame is not a known server message.
pub fn decode_bytes(bytes: &[u8]) -> Result<NetEvent, CodecError> {
    wire::decode_server(bytes).map(NetEvent::from)
}

/// Error from the outbound side.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The receiving end of the transport is gone.
    #[error("transport is closed")]
    TransportClosed,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Outbound half of the network boundary.
pub trait Transport {
    /// Hand a message to the network. Delivery is not acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TransportClosed`] when nothing is listening.
    fn send(&mut self, message: ClientMessage) -> Result<(), SyncError>;
}

/// Transport backed by an unbounded channel drained by a connection task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: UnboundedSender<ClientMessage>,
}

impl ChannelTransport {
    /// A transport and the receiver its connection task drains.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: ClientMessage) -> Result<(), SyncError> {
        self.tx.unbounded_send(message).map_err(|_| SyncError::TransportClosed)
    }
}

/// Transport for read-only engines. Accepts and discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _message: ClientMessage) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Every stroke applied this session, in application order.
#[derive(Debug, Clone, Default)]
pub struct History {
    strokes: Vec<Stroke>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Replace the whole history with an authoritative snapshot.
    pub fn replace(&mut self, strokes: Vec<Stroke>) {
        self.strokes = strokes;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Stroke] {
        &self.strokes
    }
}

/// Turns a stream of drag samples into stroke segments.
///
/// A sample emits a segment from the last emitted point when it is at least
/// [`SAMPLE_MIN_DISTANCE`] away and at least [`SAMPLE_MIN_INTERVAL_MS`] have
/// passed since the previous emission. Rejected samples leave the last point
/// where it was, so slow drags still accumulate into a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSampler {
    last: Point,
    last_emit_ms: Option<f64>,
}

impl StrokeSampler {
    /// Start a gesture at world point `at`.
    #[must_use]
    pub fn begin(at: Point) -> Self {
        Self { last: at, last_emit_ms: None }
    }

    /// The point the next segment starts from.
    #[must_use]
    pub fn last(&self) -> Point {
        self.last
    }

    /// Offer a sample at world point `at`, taken at `now_ms`.
    pub fn sample(&mut self, at: Point, now_ms: f64) -> Option<(Point, Point)> {
        if at.distance(self.last) < SAMPLE_MIN_DISTANCE {
            return None;
        }
        if let Some(prev) = self.last_emit_ms {
            if now_ms - prev < SAMPLE_MIN_INTERVAL_MS {
                return None;
            }
        }
        let from = self.last;
        self.last = at;
        self.last_emit_ms = Some(now_ms);
        Some((from, at))
    }
}

/// Exponential reconnect delay: doubles per failed attempt, capped, and
/// starts over once a connection has actually carried traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current_ms: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { current_ms: RECONNECT_INITIAL_MS }
    }
}

impl Backoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next attempt. Advances the schedule.
    pub fn next_delay_ms(&mut self) -> u32 {
        let delay = self.current_ms;
        self.current_ms = self.current_ms.saturating_mul(2).min(RECONNECT_MAX_MS);
        delay
    }

    pub fn reset(&mut self) {
        self.current_ms = RECONNECT_INITIAL_MS;
    }
}
