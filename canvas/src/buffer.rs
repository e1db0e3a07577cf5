//! Persistent raster buffer.
//!
//! A square layer in world space, one pixel per world unit, holding every
//! stroke applied this session. The ball center sits at the layer center, so a
//! world point `p` lands on layer pixel `p + world_size / 2`. The compositor
//! blits this layer instead of replaying history, which keeps a view-changing
//! frame at one clipped blit no matter how many strokes exist.

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;

use wire::Stroke;

use crate::camera::{Ball, Point};
use crate::consts::{BALL_COLOR, TRANSPARENT};
use crate::surface::{Pen, Surface, SurfaceError, Transform};

/// The accumulated drawing layer.
#[derive(Debug)]
pub struct PersistentBuffer<L> {
    layer: L,
    ball: Ball,
    applied: usize,
}

impl<L: Surface> PersistentBuffer<L> {
    /// Wrap `layer` and pre-fill it with the white ball disc.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::SizeMismatch`] unless `layer` is exactly
    /// `ball.world_size()` pixels square, or any error from the pre-fill.
    pub fn new(layer: L, ball: Ball) -> Result<Self, SurfaceError> {
        let expected = ball.world_size();
        if layer.width() != expected || layer.height() != expected {
            return Err(SurfaceError::SizeMismatch {
                expected,
                actual_w: layer.width(),
                actual_h: layer.height(),
            });
        }
        let mut buffer = Self { layer, ball, applied: 0 };
        buffer.prefill()?;
        Ok(buffer)
    }

    /// Draw one stroke permanently.
    ///
    /// Applying the same stroke twice draws it twice.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; the stroke is not counted then.
    pub fn apply(&mut self, stroke: &Stroke) -> Result<(), SurfaceError> {
        let half = self.half();
        let pen = Pen { color: &stroke.color, width: stroke.size };
        self.layer.stroke_segment(
            Point::new(stroke.x0 + half, stroke.y0 + half),
            Point::new(stroke.x1 + half, stroke.y1 + half),
            pen,
        )?;
        self.applied += 1;
        Ok(())
    }

    /// Discard every applied stroke. Only a history snapshot calls this.
    ///
    /// # Errors
    ///
    /// Propagates backend failures from the pre-fill.
    pub fn reset(&mut self) -> Result<(), SurfaceError> {
        self.prefill()
    }

    /// The underlying layer, for blitting.
    #[must_use]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    #[must_use]
    pub fn ball(&self) -> Ball {
        self.ball
    }

    /// World coordinates of the layer's top-left pixel.
    #[must_use]
    pub fn origin(&self) -> Point {
        let half = self.half();
        Point::new(-half, -half)
    }

    /// Strokes applied since creation or the last reset.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    fn half(&self) -> f64 {
        f64::from(self.ball.world_size()) * 0.5
    }

    fn prefill(&mut self) -> Result<(), SurfaceError> {
        let half = self.half();
        self.layer.set_transform(Transform::IDENTITY)?;
        self.layer.fill_all(TRANSPARENT)?;
        self.layer.fill_disc(Point::new(half, half), self.ball.radius, BALL_COLOR)?;
        self.applied = 0;
        Ok(())
    }
}
