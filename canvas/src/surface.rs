//! Drawing backend seam.
//!
//! The compositor and the persistent buffer only ever draw through
//! [`Surface`] and [`Blit`]. The browser implements them on a 2D canvas
//! context ([`crate::web::WebSurface`]); tests and the CLI use the
//! deterministic software rasterizer ([`crate::raster::Raster`]).

use crate::camera::Point;

/// Uniform scale followed by translation, mapping user space to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self { scale: 1.0, tx: 0.0, ty: 0.0 };

    /// Map a user-space point to device space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point { x: p.x * self.scale + self.tx, y: p.y * self.scale + self.ty }
    }

    /// Map a device-space point back to user space.
    #[must_use]
    pub fn invert(&self, p: Point) -> Point {
        Point { x: (p.x - self.tx) / self.scale, y: (p.y - self.ty) / self.scale }
    }
}

/// Stroke style: CSS color and line width in user-space units.
#[derive(Debug, Clone, Copy)]
pub struct Pen<'a> {
    pub color: &'a str,
    pub width: f64,
}

/// Error from a drawing backend.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// A browser canvas call threw.
    #[error("canvas call failed: {0}")]
    Canvas(String),
    /// A layer does not have the dimensions its owner requires.
    #[error("surface is {actual_w}x{actual_h}, expected {expected}x{expected}")]
    SizeMismatch { expected: u32, actual_w: u32, actual_h: u32 },
    /// Image encoding failed.
    #[error("image encode failed: {0}")]
    Encode(String),
}

/// A 2D drawing target.
///
/// Geometry arguments are in user space and pass through the current
/// transform. Segment strokes use round caps and joins. Every fill and stroke
/// respects the active clip; [`Surface::fill_all`] ignores both transform and clip.
pub trait Surface {
    /// Width in device pixels.
    fn width(&self) -> u32;

    /// Height in device pixels.
    fn height(&self) -> u32;

    /// Push transform and clip state.
    fn save(&mut self);

    /// Pop transform and clip state pushed by the matching [`Surface::save`].
    fn restore(&mut self);

    /// Replace the current transform.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn set_transform(&mut self, transform: Transform) -> Result<(), SurfaceError>;

    /// Replace every pixel with `color`.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn fill_all(&mut self, color: &str) -> Result<(), SurfaceError>;

    /// Fill a disc.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn fill_disc(&mut self, center: Point, radius: f64, color: &str) -> Result<(), SurfaceError>;

    /// Stroke a circle outline; the pen straddles `radius`.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn stroke_circle(&mut self, center: Point, radius: f64, pen: Pen<'_>) -> Result<(), SurfaceError>;

    /// Stroke a straight segment with round caps.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn stroke_segment(&mut self, from: Point, to: Point, pen: Pen<'_>) -> Result<(), SurfaceError>;

    /// Intersect the clip with a disc.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn clip_disc(&mut self, center: Point, radius: f64) -> Result<(), SurfaceError>;
}

/// A surface that can draw another layer's pixels onto itself.
pub trait Blit<L: ?Sized>: Surface {
    /// Draw `layer` with its top-left pixel at `origin` (user space), one
    /// layer pixel per user unit, through the current transform and clip.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn blit(&mut self, layer: &L, origin: Point) -> Result<(), SurfaceError>;
}
