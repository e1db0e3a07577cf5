//! Drawing engine for the shared ball canvas.
//!
//! Many clients draw onto one disc-shaped world. Every stroke lands in a
//! persistent off-screen buffer in world space; each animation frame the
//! compositor blits that buffer through the current pan/zoom onto the
//! visible canvas, or just draws the strokes that arrived since the last
//! frame. The core is backend-agnostic: the browser build paints to HTML
//! canvases, tests and the CLI paint to the software [`raster::Raster`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser [`engine::Engine`] and the testable [`engine::EngineCore`] |
//! | [`camera`] | Viewport transform: screen/world conversion, anchored zoom, pan |
//! | [`buffer`] | Append-only persistent stroke buffer |
//! | [`render`] | Compositor with full and incremental paint paths |
//! | [`sync`] | Network events, outbound transport, stroke sampling, backoff |
//! | [`gate`] | Demo quota and holdings-based access tiers |
//! | [`holdings`] | JSON-RPC token holdings check |
//! | [`wallet`] | Wallet collaborator and address normalization |
//! | [`input`] | Modifiers, buttons, brush, and the gesture state machine |
//! | [`hud`] | Throttled status snapshot for the page |
//! | [`surface`] | Drawing backend traits |
//! | [`raster`] | Deterministic software backend |
//! | [`web`] | HTML canvas backend |
//! | [`color`] | CSS color parsing for the software backend |
//! | [`consts`] | Geometry, zoom, sampling, quota and timing constants |
//!
//! With the `browser` feature, `net` adds the reconnecting websocket
//! connection and `host` wires everything to `requestAnimationFrame`.

pub mod buffer;
pub mod camera;
pub mod color;
pub mod consts;
pub mod engine;
pub mod gate;
pub mod holdings;
pub mod hud;
pub mod input;
pub mod raster;
pub mod render;
pub mod surface;
pub mod sync;
pub mod wallet;
pub mod web;

#[cfg(feature = "browser")]
pub mod host;
#[cfg(feature = "browser")]
pub mod net;

/// Route `log` records to the browser console.
#[cfg(feature = "browser")]
pub fn init_logging() {
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        log::debug!("logger already installed: {e}");
    }
}
