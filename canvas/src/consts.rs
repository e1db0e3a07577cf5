//! Shared numeric constants for the canvas crate.

// ── Ball geometry ───────────────────────────────────────────────

/// Radius of the drawable disc, in world units.
pub const BALL_RADIUS: f64 = 2000.0;

/// Extra world units around the ball inside the persistent buffer.
pub const WORLD_MARGIN: f64 = 200.0;

// ── Camera ──────────────────────────────────────────────────────

/// Minimum zoom scale.
pub const MIN_SCALE: f64 = 0.2;

/// Maximum zoom scale.
pub const MAX_SCALE: f64 = 5.0;

/// Scale change per wheel pixel.
pub const ZOOM_INTENSITY: f64 = 0.0015;

/// World units kept around the ball when fitting it to the viewport.
pub const FIT_MARGIN: f64 = 100.0;

// ── Compositor ──────────────────────────────────────────────────

/// Spacing of the background grid, in world units.
pub const GRID_STEP: f64 = 200.0;

/// Grid line width in screen pixels.
pub const GRID_WIDTH_PX: f64 = 1.0;

/// Boundary ring width in screen pixels.
pub const RING_WIDTH_PX: f64 = 4.0;

pub const BACKGROUND_COLOR: &str = "#1e1e24";
pub const GRID_COLOR: &str = "rgba(255, 255, 255, 0.08)";
pub const BALL_COLOR: &str = "#ffffff";
pub const RING_COLOR: &str = "#3a3a44";
pub const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

// ── Stroke sampling ─────────────────────────────────────────────

/// Minimum pointer travel between emitted strokes, in world units.
pub const SAMPLE_MIN_DISTANCE: f64 = 1.0;

/// Minimum time between emitted strokes, in milliseconds.
pub const SAMPLE_MIN_INTERVAL_MS: f64 = 12.0;

// ── Access ──────────────────────────────────────────────────────

/// Drag gestures allowed without full access.
pub const DEMO_LIMIT: u32 = 10;

// ── HUD ─────────────────────────────────────────────────────────

/// Minimum time between HUD snapshots (~10 Hz).
pub const HUD_INTERVAL_MS: f64 = 100.0;

// ── Reconnect ───────────────────────────────────────────────────

pub const RECONNECT_INITIAL_MS: u32 = 1000;
pub const RECONNECT_MAX_MS: u32 = 10_000;
