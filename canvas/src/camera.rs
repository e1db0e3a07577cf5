//! Viewport transform: screen ↔ world conversion, cursor-anchored zoom, pan.
//!
//! Screen coordinates are CSS pixels relative to the page (pointer event
//! `clientX/clientY`). World coordinates are zoom/pan independent; the ball
//! center is the world origin. The device pixel ratio only enters when
//! building the draw transform, so every input-side computation stays in CSS
//! pixels regardless of backing-store resolution.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{BALL_RADIUS, FIT_MARGIN, MAX_SCALE, MIN_SCALE, WORLD_MARGIN, ZOOM_INTENSITY};
use crate::surface::Transform;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The drawable disc in world space, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub radius: f64,
}

impl Default for Ball {
    fn default() -> Self {
        Self { radius: BALL_RADIUS }
    }
}

impl Ball {
    /// Side of the square persistent buffer, in world units (one pixel per unit).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn world_size(&self) -> u32 {
        (2.0 * self.radius + WORLD_MARGIN).ceil().max(1.0) as u32
    }
}

/// Where the canvas element sits on the page and how dense its backing store is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas left edge in CSS pixels.
    pub left: f64,
    /// Canvas top edge in CSS pixels.
    pub top: f64,
    /// Canvas width in CSS pixels.
    pub width: f64,
    /// Canvas height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    /// A viewport at the page origin.
    #[must_use]
    pub fn sized(width: f64, height: f64, dpr: f64) -> Self {
        Self { left: 0.0, top: 0.0, width, height, dpr }
    }

    /// Backing-store size in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn device_size(&self) -> (u32, u32) {
        let w = (self.width * self.dpr).round().max(0.0);
        let h = (self.height * self.dpr).round().max(0.0);
        (w as u32, h as u32)
    }
}

/// Clamp a zoom scale into the supported range. Non-finite input maps to the minimum.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { MIN_SCALE }
}

/// View state: zoom scale and world-space offset.
///
/// `world = (screen - canvas_origin - canvas_size / 2) / scale - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub offset: Point,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, offset: Point::default() }
    }
}

impl Camera {
    /// A camera showing the whole ball plus a margin, centered.
    #[must_use]
    pub fn fit_ball(viewport: &Viewport, ball: &Ball) -> Self {
        let span = 2.0 * ball.radius + 2.0 * FIT_MARGIN;
        let fit = viewport.width.min(viewport.height) / span;
        Self { scale: clamp_scale(fit), offset: Point::default() }
    }

    /// Convert a page-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn to_world(&self, viewport: &Viewport, screen: Point) -> Point {
        let local_x = screen.x - viewport.left - viewport.width * 0.5;
        let local_y = screen.y - viewport.top - viewport.height * 0.5;
        Point {
            x: local_x / self.scale - self.offset.x,
            y: local_y / self.scale - self.offset.y,
        }
    }

    /// Convert a world-space point to page coordinates (CSS pixels).
    #[must_use]
    pub fn to_screen(&self, viewport: &Viewport, world: Point) -> Point {
        Point {
            x: (world.x + self.offset.x) * self.scale + viewport.width * 0.5 + viewport.left,
            y: (world.y + self.offset.y) * self.scale + viewport.height * 0.5 + viewport.top,
        }
    }

    /// Zoom by a wheel delta, keeping the world point under `screen` fixed.
    ///
    /// Negative `wheel_dy` (scroll up) zooms in. Returns `false` when the
    /// scale is already pinned at the bound the delta pushes toward.
    #[allow(clippy::float_cmp)]
    pub fn zoom_at(&mut self, viewport: &Viewport, screen: Point, wheel_dy: f64) -> bool {
        let new_scale = clamp_scale(self.scale * (1.0 - wheel_dy * ZOOM_INTENSITY));
        if new_scale == self.scale {
            return false;
        }

        let before = self.to_world(viewport, screen);
        self.scale = new_scale;
        // Same offset, new scale: the cursor now sits over a different world point.
        let after = self.to_world(viewport, screen);
        self.offset.x += after.x - before.x;
        self.offset.y += after.y - before.y;
        true
    }

    /// Begin a pan gesture at `screen`.
    #[must_use]
    pub fn pan_anchor(&self, screen: Point) -> PanAnchor {
        PanAnchor { start_screen: screen, start_offset: self.offset, start_scale: self.scale }
    }

    /// Move the view so the world point grabbed at the anchor follows `screen`.
    pub fn pan_to(&mut self, anchor: &PanAnchor, screen: Point) {
        self.offset = anchor.offset_for(screen);
    }

    /// Device-pixel draw transform for the current view.
    #[must_use]
    pub fn view_transform(&self, viewport: &Viewport) -> Transform {
        let dpr = viewport.dpr;
        Transform {
            scale: dpr * self.scale,
            tx: dpr * (viewport.width * 0.5 + self.scale * self.offset.x),
            ty: dpr * (viewport.height * 0.5 + self.scale * self.offset.y),
        }
    }

    /// World-space bounds of the visible canvas area as `(min, max)`.
    #[must_use]
    pub fn visible_world(&self, viewport: &Viewport) -> (Point, Point) {
        let min = self.to_world(viewport, Point::new(viewport.left, viewport.top));
        let max = self.to_world(
            viewport,
            Point::new(viewport.left + viewport.width, viewport.top + viewport.height),
        );
        (min, max)
    }
}

/// Gesture context captured when a pan starts.
///
/// The offset is always recomputed from the start state rather than
/// accumulated, so many small moves cannot drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnchor {
    pub start_screen: Point,
    pub start_offset: Point,
    pub start_scale: f64,
}

impl PanAnchor {
    /// Offset that keeps the grabbed world point under `screen`.
    #[must_use]
    pub fn offset_for(&self, screen: Point) -> Point {
        Point {
            x: self.start_offset.x + (screen.x - self.start_screen.x) / self.start_scale,
            y: self.start_offset.y + (screen.y - self.start_screen.y) / self.start_scale,
        }
    }
}
