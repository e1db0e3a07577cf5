//! Deterministic software rasterizer.
//!
//! Implements [`Surface`] over an [`image::RgbaImage`]. Coverage comes from
//! exact distance fields with a one-pixel anti-aliasing ramp, blending is
//! straight-alpha source-over, and blits sample nearest-neighbour. No state
//! outside the image and the transform/clip stack affects output, so replaying
//! the same draw calls onto two rasters yields identical bytes.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::io::Cursor;

use image::{ImageFormat, Rgba as Pixel, RgbaImage};

use crate::camera::Point;
use crate::color::{self, Rgba};
use crate::surface::{Blit, Pen, Surface, SurfaceError, Transform};

/// Narrowest line the rasterizer draws, in device pixels.
const MIN_HALF_WIDTH: f64 = 0.5;

/// Clip disc in device space.
#[derive(Debug, Clone, Copy)]
struct Disc {
    center: Point,
    radius: f64,
}

impl Disc {
    fn coverage(&self, p: Point) -> f64 {
        edge_coverage(self.radius - p.distance(self.center))
    }
}

/// A CPU-side drawing surface.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbaImage,
    transform: Transform,
    clips: Vec<Disc>,
    saved: Vec<(Transform, usize)>,
}

impl Raster {
    /// A fully transparent raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            transform: Transform::IDENTITY,
            clips: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// The underlying pixels.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// RGBA at a device pixel, if inside the raster.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Encode the raster as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Encode`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    /// Device pixels covered by a device-space box, clipped to the raster and the active clips.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn span(&self, min: Point, max: Point) -> Option<(u32, u32, u32, u32)> {
        let mut x0 = min.x.floor();
        let mut y0 = min.y.floor();
        let mut x1 = max.x.ceil();
        let mut y1 = max.y.ceil();
        for disc in &self.clips {
            x0 = x0.max((disc.center.x - disc.radius - 1.0).floor());
            y0 = y0.max((disc.center.y - disc.radius - 1.0).floor());
            x1 = x1.min((disc.center.x + disc.radius + 1.0).ceil());
            y1 = y1.min((disc.center.y + disc.radius + 1.0).ceil());
        }
        x0 = x0.max(0.0);
        y0 = y0.max(0.0);
        x1 = x1.min(f64::from(self.image.width()));
        y1 = y1.min(f64::from(self.image.height()));
        // Also rejects NaN bounds.
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn clip_coverage(&self, p: Point) -> f64 {
        self.clips.iter().map(|d| d.coverage(p)).product()
    }

    /// Blend `color` into every pixel of the box in proportion to `coverage`.
    fn paint(&mut self, min: Point, max: Point, color: Rgba, coverage: impl Fn(Point) -> f64) {
        let Some((x0, y0, x1, y1)) = self.span(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let shape = coverage(center);
                if shape <= 0.0 {
                    continue;
                }
                let total = shape * self.clip_coverage(center);
                if total > 0.0 {
                    blend(self.image.get_pixel_mut(x, y), color, total);
                }
            }
        }
    }

    fn half_width(&self, pen: Pen<'_>) -> f64 {
        (pen.width * self.transform.scale * 0.5).max(MIN_HALF_WIDTH)
    }
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn save(&mut self) {
        self.saved.push((self.transform, self.clips.len()));
    }

    fn restore(&mut self) {
        if let Some((transform, clip_depth)) = self.saved.pop() {
            self.transform = transform;
            self.clips.truncate(clip_depth);
        }
    }

    fn set_transform(&mut self, transform: Transform) -> Result<(), SurfaceError> {
        self.transform = transform;
        Ok(())
    }

    fn fill_all(&mut self, color: &str) -> Result<(), SurfaceError> {
        let rgba = color::parse_or_black(color);
        for pixel in self.image.pixels_mut() {
            pixel.0 = rgba;
        }
        Ok(())
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: &str) -> Result<(), SurfaceError> {
        let c = self.transform.apply(center);
        let r = radius * self.transform.scale;
        let reach = r + 1.0;
        self.paint(
            Point::new(c.x - reach, c.y - reach),
            Point::new(c.x + reach, c.y + reach),
            color::parse_or_black(color),
            |p| edge_coverage(r - p.distance(c)),
        );
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, pen: Pen<'_>) -> Result<(), SurfaceError> {
        let c = self.transform.apply(center);
        let r = radius * self.transform.scale;
        let half = self.half_width(pen);
        let reach = r + half + 1.0;
        self.paint(
            Point::new(c.x - reach, c.y - reach),
            Point::new(c.x + reach, c.y + reach),
            color::parse_or_black(pen.color),
            |p| edge_coverage(half - (p.distance(c) - r).abs()),
        );
        Ok(())
    }

    fn stroke_segment(&mut self, from: Point, to: Point, pen: Pen<'_>) -> Result<(), SurfaceError> {
        let a = self.transform.apply(from);
        let b = self.transform.apply(to);
        let half = self.half_width(pen);
        let reach = half + 1.0;
        self.paint(
            Point::new(a.x.min(b.x) - reach, a.y.min(b.y) - reach),
            Point::new(a.x.max(b.x) + reach, a.y.max(b.y) + reach),
            color::parse_or_black(pen.color),
            |p| edge_coverage(half - segment_distance(p, a, b)),
        );
        Ok(())
    }

    fn clip_disc(&mut self, center: Point, radius: f64) -> Result<(), SurfaceError> {
        self.clips.push(Disc {
            center: self.transform.apply(center),
            radius: radius * self.transform.scale,
        });
        Ok(())
    }
}

impl Blit<Raster> for Raster {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn blit(&mut self, layer: &Raster, origin: Point) -> Result<(), SurfaceError> {
        let t = self.transform;
        let layer_w = f64::from(layer.width());
        let layer_h = f64::from(layer.height());
        let top_left = t.apply(origin);
        let bottom_right = t.apply(Point::new(origin.x + layer_w, origin.y + layer_h));
        let Some((x0, y0, x1, y1)) = self.span(top_left, bottom_right) else {
            return Ok(());
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let user = t.invert(center);
                let lx = (user.x - origin.x).floor();
                let ly = (user.y - origin.y).floor();
                if lx < 0.0 || ly < 0.0 || lx >= layer_w || ly >= layer_h {
                    continue;
                }
                let src = layer.image.get_pixel(lx as u32, ly as u32).0;
                let clip = self.clip_coverage(center);
                if clip > 0.0 {
                    blend(self.image.get_pixel_mut(x, y), src, clip);
                }
            }
        }
        Ok(())
    }
}

/// Fraction of a pixel inside a shape, given the distance from the pixel
/// center to the shape edge (positive inside).
fn edge_coverage(inside: f64) -> f64 {
    (inside + 0.5).clamp(0.0, 1.0)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(dst: &mut Pixel<u8>, src: Rgba, coverage: f64) {
    let sa = f64::from(src[3]) / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    let [dr, dg, db, da] = dst.0;
    let da = f64::from(da) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| {
        let c = (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    dst.0 = [
        mix(src[0], dr),
        mix(src[1], dg),
        mix(src[2], db),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ];
}
