#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;
use wire::{ClientMessage, Stroke};

use crate::buffer::PersistentBuffer;
use crate::camera::{Ball, Camera, Point, Viewport};
use crate::color;
use crate::gate::{AccessState, AccessTier, GateError};
use crate::holdings::{Holdings, HoldingsError};
use crate::hud::{HudSnapshot, HudThrottle};
use crate::input::{Brush, Button, GestureKind, InputState, Modifiers, WheelDelta};
use crate::render::{Compositor, Paint};
use crate::surface::{Blit, Surface, SurfaceError};
use crate::sync::{ConnectionStatus, History, NetEvent, StrokeSampler, Transport};
use crate::web::WebSurface;

const CURSOR_DRAW: &str = "crosshair";
const CURSOR_GRAB: &str = "grabbing";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    /// A local stroke was applied and handed to the transport.
    StrokeCommitted(Stroke),
    SetCursor(String),
    Notice(Notice),
}

/// Non-blocking, user-visible messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A draw gesture was refused because the demo quota is spent.
    QuotaExhausted { limit: u32 },
    /// The holdings check failed; drawing continues on the demo quota.
    HoldingsCheckFailed { reason: String },
    FullAccessGranted { holdings: String },
    /// The check resolved below the threshold.
    DemoAccess { holdings: String },
    ConnectionLost,
    /// A fresh snapshot replaced local state after a reconnect.
    Resynced { strokes: usize },
}

impl Notice {
    /// Text for the page banner.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::QuotaExhausted { limit } => {
                format!("Demo limit reached ({limit} strokes). Connect a qualifying wallet to keep drawing.")
            }
            Self::HoldingsCheckFailed { reason } => {
                format!("Could not verify holdings ({reason}). Continuing in demo mode.")
            }
            Self::FullAccessGranted { holdings } => format!("Full access: {holdings}"),
            Self::DemoAccess { holdings } => format!("Demo mode: {holdings} is below the threshold"),
            Self::ConnectionLost => "Disconnected. Reconnecting...".to_owned(),
            Self::Resynced { strokes } => format!("Reconnected, {strokes} strokes loaded"),
        }
    }
}

/// Core engine state: all logic that does not depend on a browser canvas.
///
/// Generic over the buffer layer so tests and headless tools run it on the
/// software rasterizer. Every handler runs to completion and returns the
/// actions the host should carry out.
pub struct EngineCore<L> {
    pub camera: Camera,
    pub viewport: Viewport,
    pub brush: Brush,
    pub input: InputState,
    pub access: AccessState,
    pub history: History,
    pub buffer: PersistentBuffer<L>,
    pub compositor: Compositor,
    status: ConnectionStatus,
    /// Set when an established connection drops; cleared by the next snapshot.
    awaiting_resync: bool,
    transport: Box<dyn Transport>,
    hud: HudThrottle,
}

impl<L: Surface> EngineCore<L> {
    /// Build an engine over a `ball.world_size()` square buffer layer.
    ///
    /// # Errors
    ///
    /// Propagates [`PersistentBuffer::new`] failures.
    pub fn new(layer: L, ball: Ball, transport: Box<dyn Transport>) -> Result<Self, SurfaceError> {
        Ok(Self {
            camera: Camera::default(),
            viewport: Viewport::default(),
            brush: Brush::default(),
            input: InputState::default(),
            access: AccessState::new(),
            history: History::new(),
            buffer: PersistentBuffer::new(layer, ball)?,
            compositor: Compositor::new(),
            status: ConnectionStatus::default(),
            awaiting_resync: false,
            transport,
            hud: HudThrottle::new(),
        })
    }

    // --- View ---

    /// Update canvas placement, size and device pixel ratio.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<Action> {
        if viewport == self.viewport {
            return Vec::new();
        }
        self.viewport = viewport;
        self.compositor.invalidate();
        vec![Action::RenderNeeded]
    }

    /// Show the whole ball, centered.
    pub fn fit_to_ball(&mut self) -> Vec<Action> {
        self.camera = Camera::fit_ball(&self.viewport, &self.buffer.ball());
        self.compositor.invalidate();
        vec![Action::RenderNeeded]
    }

    pub fn set_brush(&mut self, color: &str, size: f64) {
        // Normalise through the stroke constructor so defaults match the wire.
        let probe = Stroke::new((0.0, 0.0), (0.0, 0.0), color::stroke_color(color), size);
        self.brush = Brush { color: probe.color, size: probe.size };
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if !matches!(self.input, InputState::Idle) {
            return Vec::new();
        }
        match GestureKind::classify(button, modifiers) {
            GestureKind::Pan => {
                self.input = InputState::Panning { anchor: self.camera.pan_anchor(screen) };
                vec![Action::SetCursor(CURSOR_GRAB.into())]
            }
            GestureKind::Draw => match self.access.try_begin_gesture() {
                Ok(()) => {
                    let world = self.camera.to_world(&self.viewport, screen);
                    self.input = InputState::Drawing { sampler: StrokeSampler::begin(world) };
                    vec![Action::SetCursor(CURSOR_DRAW.into())]
                }
                Err(GateError::QuotaExceeded { limit }) => {
                    log::info!("draw gesture refused: demo limit {limit} reached");
                    vec![Action::Notice(Notice::QuotaExhausted { limit })]
                }
            },
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point, now_ms: f64) -> Vec<Action> {
        let world = self.camera.to_world(&self.viewport, screen);
        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { anchor } => {
                self.camera.pan_to(anchor, screen);
                self.compositor.invalidate();
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { sampler } => {
                let Some((from, to)) = sampler.sample(world, now_ms) else {
                    return Vec::new();
                };
                let stroke = Stroke::new((from.x, from.y), (to.x, to.y), self.brush.color.clone(), self.brush.size);
                self.commit_local(stroke)
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } | InputState::Drawing { .. } => {
                vec![Action::SetCursor(CURSOR_DRAW.into())]
            }
        }
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.camera.zoom_at(&self.viewport, screen, delta.dy) {
            return Vec::new();
        }
        self.compositor.invalidate();
        vec![Action::RenderNeeded]
    }

    // --- Network ---

    /// Absorb one event from the inbound channel.
    pub fn on_net_event(&mut self, event: NetEvent) -> Vec<Action> {
        match event {
            NetEvent::HistorySnapshot(strokes) => self.load_snapshot(strokes),
            NetEvent::StrokeAppended(stroke) => {
                // Remote strokes are never sent back out.
                self.absorb(stroke);
                vec![Action::RenderNeeded]
            }
            NetEvent::ConnectionStateChanged(status) => self.set_status(status),
        }
    }

    fn load_snapshot(&mut self, strokes: Vec<Stroke>) -> Vec<Action> {
        if let Err(e) = self.buffer.reset() {
            log::error!("failed to reset persistent buffer: {e}");
        }
        for stroke in &strokes {
            if let Err(e) = self.buffer.apply(stroke) {
                log::error!("failed to replay stroke: {e}");
            }
        }
        let count = strokes.len();
        self.history.replace(strokes);
        self.compositor.invalidate();
        self.hud.reset();
        log::info!("history snapshot loaded: {count} strokes");

        let mut actions = vec![Action::RenderNeeded];
        if std::mem::take(&mut self.awaiting_resync) {
            actions.push(Action::Notice(Notice::Resynced { strokes: count }));
        }
        actions
    }

    fn set_status(&mut self, status: ConnectionStatus) -> Vec<Action> {
        let previous = std::mem::replace(&mut self.status, status);
        if previous == status {
            return Vec::new();
        }
        self.hud.reset();
        log::info!("connection {previous:?} -> {status:?}");
        if previous == ConnectionStatus::Connected {
            self.awaiting_resync = true;
            return vec![Action::Notice(Notice::ConnectionLost)];
        }
        Vec::new()
    }

    /// Local echo first, then the network. A failed send keeps the stroke locally.
    fn commit_local(&mut self, stroke: Stroke) -> Vec<Action> {
        self.absorb(stroke.clone());
        if let Err(e) = self.transport.send(ClientMessage::Stroke(stroke.clone())) {
            log::warn!("stroke kept locally, send failed: {e}");
        }
        vec![Action::StrokeCommitted(stroke), Action::RenderNeeded]
    }

    fn absorb(&mut self, mut stroke: Stroke) {
        let resolved = color::stroke_color(&stroke.color);
        if resolved != stroke.color {
            log::debug!("unrecognised stroke color {:?}, painting {resolved}", stroke.color);
            stroke.color = resolved.to_owned();
        }
        if let Err(e) = self.buffer.apply(&stroke) {
            log::error!("failed to apply stroke: {e}");
        }
        self.compositor.queue(stroke.clone());
        self.history.push(stroke);
    }

    // --- Access ---

    pub fn wallet_connected(&mut self, address: &str) {
        self.access.wallet_connected(address);
        self.hud.reset();
    }

    pub fn wallet_disconnected(&mut self) {
        self.access.wallet_disconnected();
        self.hud.reset();
    }

    /// The wallet could not be connected; fall back to the demo quota.
    pub fn wallet_failed(&mut self, reason: String) -> Vec<Action> {
        log::warn!("wallet unavailable, falling back to demo: {reason}");
        self.access.wallet_failed();
        self.hud.reset();
        vec![Action::Notice(Notice::HoldingsCheckFailed { reason })]
    }

    /// Apply a finished holdings check for `address`.
    pub fn resolve_holdings(&mut self, address: &str, result: Result<Holdings, HoldingsError>) -> Vec<Action> {
        let failure = result.as_ref().err().map(ToString::to_string);
        let Some(tier) = self.access.resolve(address, result) else {
            return Vec::new();
        };
        self.hud.reset();
        let holdings = self.access.holdings().unwrap_or_default().to_owned();
        let notice = match (tier, failure) {
            (_, Some(reason)) => Notice::HoldingsCheckFailed { reason },
            (AccessTier::Full, None) => Notice::FullAccessGranted { holdings },
            (_, None) => Notice::DemoAccess { holdings },
        };
        vec![Action::Notice(notice)]
    }

    // --- Render ---

    /// Paint whatever changed since the last call.
    ///
    /// # Errors
    ///
    /// Propagates surface failures; the next call retries with a full paint.
    pub fn render<D: Blit<L>>(&mut self, display: &mut D) -> Result<Paint, SurfaceError> {
        self.compositor.paint(display, &self.buffer, &self.camera, &self.viewport)
    }

    /// A HUD snapshot, at most once per HUD interval.
    pub fn hud(&mut self, now_ms: f64) -> Option<HudSnapshot> {
        if self.hud.ready(now_ms) { Some(self.snapshot()) } else { None }
    }

    // --- Queries ---

    #[must_use]
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            scale: self.camera.scale,
            offset_x: self.camera.offset.x,
            offset_y: self.camera.offset.y,
            stroke_count: self.history.len(),
            connection: self.status,
            access: self.access.tier(),
            demo_remaining: self.access.demo_remaining(),
            holdings: self.access.holdings().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.history.len()
    }
}

/// The browser engine. Wraps `EngineCore` and owns the display canvas.
pub struct Engine {
    display: WebSurface,
    pub core: EngineCore<WebSurface>,
}

impl Engine {
    /// Bind to `canvas` and allocate the off-screen buffer canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, transport: Box<dyn Transport>) -> Result<Self, JsValue> {
        let display = WebSurface::from_canvas(canvas)?;
        let ball = Ball::default();
        let size = ball.world_size();
        let layer = WebSurface::offscreen(size, size)?;
        let core = EngineCore::new(layer, ball, transport).map_err(to_js)?;
        Ok(Self { display, core })
    }

    /// Resize the backing store and update the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<Action> {
        if viewport != self.core.viewport {
            let (w, h) = viewport.device_size();
            self.display.resize(w, h);
        }
        self.core.set_viewport(viewport)
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a canvas call fails.
    pub fn render(&mut self) -> Result<Paint, SurfaceError> {
        self.core.render(&mut self.display)
    }
}

fn to_js(e: SurfaceError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
