//! Stroke value type and realtime message codec.
//!
//! This crate owns the wire representation used by the canvas engine and the
//! CLI. A message travels either as a JSON text frame or as a protobuf binary
//! frame; both carry the same two server messages (`history_snapshot`,
//! `stroke`) and the single client message (`stroke`).

use prost::Message;
use serde::{Deserialize, Serialize};

/// Color used when a stroke arrives without one.
pub const DEFAULT_COLOR: &str = "#000000";

/// Line width used when a stroke arrives without a usable one.
pub const DEFAULT_SIZE: f64 = 4.0;

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf envelope.
    #[error("failed to decode protobuf message: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The text could not be parsed as a JSON message.
    #[error("failed to decode JSON message: {0}")]
    Json(#[from] serde_json::Error),
    /// The protobuf envelope carried no payload.
    #[error("message has no payload")]
    MissingPayload,
    /// A stroke coordinate was NaN or infinite.
    #[error("stroke coordinate is not finite")]
    NonFinite,
    /// A valid message arrived in a direction that does not carry it.
    #[error("unexpected {0} message")]
    UnexpectedMessage(&'static str),
}

/// One line segment in world coordinates.
///
/// Immutable once built. Strokes carry no identity, so two equal strokes are
/// indistinguishable to every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStroke")]
pub struct Stroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub size: f64,
}

impl Stroke {
    /// Build a stroke from two endpoints, resolving color and size defaults.
    #[must_use]
    pub fn new(from: (f64, f64), to: (f64, f64), color: impl Into<String>, size: f64) -> Self {
        let color = color.into();
        let color = if color.trim().is_empty() { DEFAULT_COLOR.to_owned() } else { color };
        let size = if size.is_finite() && size > 0.0 { size } else { DEFAULT_SIZE };
        Self { x0: from.0, y0: from.1, x1: to.0, y1: to.1, color, size }
    }

    /// Start point.
    #[must_use]
    pub fn start(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    /// End point.
    #[must_use]
    pub fn end(&self) -> (f64, f64) {
        (self.x1, self.y1)
    }

    fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1].iter().all(|v| v.is_finite())
    }
}

/// Loosely-shaped stroke as it appears in JSON; only the endpoints are required.
#[derive(Deserialize)]
struct RawStroke {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    size: Option<f64>,
}

impl From<RawStroke> for Stroke {
    fn from(raw: RawStroke) -> Self {
        Stroke::new(
            (raw.x0, raw.y0),
            (raw.x1, raw.y1),
            raw.color.unwrap_or_default(),
            raw.size.unwrap_or(DEFAULT_SIZE),
        )
    }
}

/// Server → client message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Every stroke accepted so far, in order. Sent on every (re)connect.
    HistorySnapshot { strokes: Vec<Stroke> },
    /// One stroke drawn by another client.
    Stroke(Stroke),
}

/// Client → server message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A locally drawn stroke for the server to persist and rebroadcast.
    Stroke(Stroke),
}

impl ServerMessage {
    /// Parse a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] for malformed or unknown messages.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ClientMessage {
    /// Parse a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] for malformed or unknown messages.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encode a server message into protobuf bytes.
#[must_use]
pub fn encode_server(message: &ServerMessage) -> Vec<u8> {
    let payload = match message {
        ServerMessage::HistorySnapshot { strokes } => WirePayload::HistorySnapshot(WireHistory {
            strokes: strokes.iter().map(stroke_to_wire).collect(),
        }),
        ServerMessage::Stroke(stroke) => WirePayload::Stroke(stroke_to_wire(stroke)),
    };
    encode_envelope(payload)
}

/// Decode protobuf bytes into a server message.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes, [`CodecError::MissingPayload`]
/// for an empty envelope and [`CodecError::NonFinite`] for unusable coordinates.
pub fn decode_server(bytes: &[u8]) -> Result<ServerMessage, CodecError> {
    match decode_envelope(bytes)? {
        WirePayload::HistorySnapshot(history) => {
            let strokes = history
                .strokes
                .into_iter()
                .map(wire_to_stroke)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ServerMessage::HistorySnapshot { strokes })
        }
        WirePayload::Stroke(stroke) => Ok(ServerMessage::Stroke(wire_to_stroke(stroke)?)),
    }
}

/// Encode a client message into protobuf bytes.
#[must_use]
pub fn encode_client(message: &ClientMessage) -> Vec<u8> {
    let ClientMessage::Stroke(stroke) = message;
    encode_envelope(WirePayload::Stroke(stroke_to_wire(stroke)))
}

/// Decode protobuf bytes into a client message.
///
/// # Errors
///
/// As [`decode_server`], plus [`CodecError::UnexpectedMessage`] when the
/// envelope holds a history snapshot.
pub fn decode_client(bytes: &[u8]) -> Result<ClientMessage, CodecError> {
    match decode_envelope(bytes)? {
        WirePayload::Stroke(stroke) => Ok(ClientMessage::Stroke(wire_to_stroke(stroke)?)),
        WirePayload::HistorySnapshot(_) => Err(CodecError::UnexpectedMessage("history_snapshot")),
    }
}

fn encode_envelope(payload: WirePayload) -> Vec<u8> {
    WireEnvelope { payload: Some(payload) }.encode_to_vec()
}

fn decode_envelope(bytes: &[u8]) -> Result<WirePayload, CodecError> {
    WireEnvelope::decode(bytes)?
        .payload
        .ok_or(CodecError::MissingPayload)
}

fn stroke_to_wire(stroke: &Stroke) -> WireStroke {
    WireStroke {
        x0: stroke.x0,
        y0: stroke.y0,
        x1: stroke.x1,
        y1: stroke.y1,
        color: stroke.color.clone(),
        size: stroke.size,
    }
}

fn wire_to_stroke(wire: WireStroke) -> Result<Stroke, CodecError> {
    let stroke = Stroke::new((wire.x0, wire.y0), (wire.x1, wire.y1), wire.color, wire.size);
    if stroke.is_finite() { Ok(stroke) } else { Err(CodecError::NonFinite) }
}

#[derive(Clone, PartialEq, Message)]
struct WireEnvelope {
    #[prost(oneof = "WirePayload", tags = "1, 2")]
    payload: Option<WirePayload>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
enum WirePayload {
    #[prost(message, tag = "1")]
    HistorySnapshot(WireHistory),
    #[prost(message, tag = "2")]
    Stroke(WireStroke),
}

#[derive(Clone, PartialEq, Message)]
struct WireHistory {
    #[prost(message, repeated, tag = "1")]
    strokes: Vec<WireStroke>,
}

#[derive(Clone, PartialEq, Message)]
struct WireStroke {
    #[prost(double, tag = "1")]
    x0: f64,
    #[prost(double, tag = "2")]
    y0: f64,
    #[prost(double, tag = "3")]
    x1: f64,
    #[prost(double, tag = "4")]
    y1: f64,
    #[prost(string, tag = "5")]
    color: String,
    #[prost(double, tag = "6")]
    size: f64,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
