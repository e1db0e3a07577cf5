//! Display compositor.
//!
//! Produces the visible frame from the camera, viewport and persistent
//! buffer. A view change (resize, pan, zoom, history snapshot) marks the
//! frame dirty and the next paint redraws everything: background, grid,
//! clipped ball and buffer blit, boundary ring. Otherwise only strokes queued
//! since the last paint are drawn, clipped to the ball, followed by one ring
//! re-stroke for the whole batch so stroke edges never eat into the ring.
//!
//! All fallible surface calls propagate via `Result<_, SurfaceError>`. The
//! caller ([`crate::engine::EngineCore::render`]) logs and carries on.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use wire::Stroke;

use crate::buffer::PersistentBuffer;
use crate::camera::{Ball, Camera, Point, Viewport};
use crate::consts::{BACKGROUND_COLOR, BALL_COLOR, GRID_COLOR, GRID_STEP, GRID_WIDTH_PX, RING_COLOR, RING_WIDTH_PX};
use crate::surface::{Blit, Pen, Surface, SurfaceError, Transform};

/// What a call to [`Compositor::paint`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Nothing changed since the last paint.
    Idle,
    /// Whole frame redrawn.
    Full,
    /// This many queued strokes drawn on top of the previous frame.
    Incremental(usize),
}

/// Tracks what the next paint has to do.
#[derive(Debug)]
pub struct Compositor {
    needs_full: bool,
    pending: Vec<Stroke>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self { needs_full: true, pending: Vec::new() }
    }
}

impl Compositor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next paint to redraw the whole frame.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    /// Queue a stroke already applied to the buffer for incremental drawing.
    pub fn queue(&mut self, stroke: Stroke) {
        self.pending.push(stroke);
    }

    #[must_use]
    pub fn needs_full(&self) -> bool {
        self.needs_full
    }

    /// Strokes waiting for the next incremental paint.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Bring `display` up to date.
    ///
    /// A full paint already includes every queued stroke through the buffer
    /// blit, so it drops the queue. A failed paint leaves the frame dirty.
    ///
    /// # Errors
    ///
    /// Propagates the first backend failure.
    pub fn paint<D, L>(
        &mut self,
        display: &mut D,
        buffer: &PersistentBuffer<L>,
        camera: &Camera,
        viewport: &Viewport,
    ) -> Result<Paint, SurfaceError>
    where
        D: Blit<L>,
        L: Surface,
    {
        if self.needs_full {
            draw_full(display, buffer, camera, viewport)?;
            self.needs_full = false;
            self.pending.clear();
            return Ok(Paint::Full);
        }
        if self.pending.is_empty() {
            return Ok(Paint::Idle);
        }

        let strokes = std::mem::take(&mut self.pending);
        if let Err(e) = draw_incremental(display, &strokes, buffer.ball(), camera, viewport) {
            self.needs_full = true;
            return Err(e);
        }
        Ok(Paint::Incremental(strokes.len()))
    }
}

fn draw_full<D, L>(
    display: &mut D,
    buffer: &PersistentBuffer<L>,
    camera: &Camera,
    viewport: &Viewport,
) -> Result<(), SurfaceError>
where
    D: Blit<L>,
    L: Surface,
{
    display.set_transform(Transform::IDENTITY)?;
    display.fill_all(BACKGROUND_COLOR)?;
    display.set_transform(camera.view_transform(viewport))?;
    draw_grid(display, camera, viewport)?;

    display.save();
    let inner = draw_ball(display, buffer);
    display.restore();
    inner?;

    stroke_ring(display, buffer.ball(), camera)
}

fn draw_ball<D, L>(display: &mut D, buffer: &PersistentBuffer<L>) -> Result<(), SurfaceError>
where
    D: Blit<L>,
    L: Surface,
{
    let center = Point::default();
    let radius = buffer.ball().radius;
    display.clip_disc(center, radius)?;
    display.fill_disc(center, radius, BALL_COLOR)?;
    display.blit(buffer.layer(), buffer.origin())
}

/// World-aligned grid over the visible area, one screen pixel wide at any zoom.
fn draw_grid<D: Surface>(display: &mut D, camera: &Camera, viewport: &Viewport) -> Result<(), SurfaceError> {
    let (min, max) = camera.visible_world(viewport);
    let pen = Pen { color: GRID_COLOR, width: GRID_WIDTH_PX / camera.scale };

    // Step over whole multiples so lines stay exactly on the grid.
    let mut i = (min.x / GRID_STEP).floor();
    while i * GRID_STEP <= max.x {
        let x = i * GRID_STEP;
        display.stroke_segment(Point::new(x, min.y), Point::new(x, max.y), pen)?;
        i += 1.0;
    }
    let mut j = (min.y / GRID_STEP).floor();
    while j * GRID_STEP <= max.y {
        let y = j * GRID_STEP;
        display.stroke_segment(Point::new(min.x, y), Point::new(max.x, y), pen)?;
        j += 1.0;
    }
    Ok(())
}

fn draw_incremental<D: Surface>(
    display: &mut D,
    strokes: &[Stroke],
    ball: Ball,
    camera: &Camera,
    viewport: &Viewport,
) -> Result<(), SurfaceError> {
    display.set_transform(camera.view_transform(viewport))?;

    display.save();
    let inner = draw_clipped_strokes(display, strokes, ball);
    display.restore();
    inner?;

    stroke_ring(display, ball, camera)
}

fn draw_clipped_strokes<D: Surface>(display: &mut D, strokes: &[Stroke], ball: Ball) -> Result<(), SurfaceError> {
    display.clip_disc(Point::default(), ball.radius)?;
    for stroke in strokes {
        let pen = Pen { color: &stroke.color, width: stroke.size };
        display.stroke_segment(Point::new(stroke.x0, stroke.y0), Point::new(stroke.x1, stroke.y1), pen)?;
    }
    Ok(())
}

/// Boundary ring, unclipped, constant width on screen.
fn stroke_ring<D: Surface>(display: &mut D, ball: Ball, camera: &Camera) -> Result<(), SurfaceError> {
    let pen = Pen { color: RING_COLOR, width: RING_WIDTH_PX / camera.scale };
    display.stroke_circle(Point::default(), ball.radius, pen)
}
