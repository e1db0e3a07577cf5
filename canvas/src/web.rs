//! [`Surface`] over a browser 2D canvas context.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wire::DEFAULT_COLOR;

use crate::camera::Point;
use crate::surface::{Blit, Pen, Surface, SurfaceError, Transform};

/// A canvas element and its 2D context.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl WebSurface {
    /// Wrap an existing canvas element.
    ///
    /// # Errors
    ///
    /// Returns an error if the 2D context is unavailable.
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// A detached canvas of the given size, never attached to the document.
    ///
    /// # Errors
    ///
    /// Returns an error outside a browser window or if canvas creation fails.
    pub fn offscreen(width: u32, height: u32) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
        canvas.set_width(width);
        canvas.set_height(height);
        Self::from_canvas(canvas)
    }

    /// Resize the backing store. Clears the canvas.
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn disc_path(&self, center: Point, radius: f64) -> Result<(), SurfaceError> {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).map_err(js_err)
    }

    // The 2D context keeps its previous style when handed a color it cannot
    // parse, so start from the default.
    fn apply_pen(&self, pen: Pen<'_>) {
        self.ctx.set_stroke_style_str(DEFAULT_COLOR);
        self.ctx.set_stroke_style_str(pen.color);
        self.ctx.set_line_width(pen.width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }
}

fn js_err(value: JsValue) -> SurfaceError {
    SurfaceError::Canvas(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

impl Surface for WebSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_transform(&mut self, t: Transform) -> Result<(), SurfaceError> {
        self.ctx.set_transform(t.scale, 0.0, 0.0, t.scale, t.tx, t.ty).map_err(js_err)
    }

    fn fill_all(&mut self, color: &str) -> Result<(), SurfaceError> {
        let w = f64::from(self.width());
        let h = f64::from(self.height());
        self.ctx.save();
        let result = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        if result.is_ok() {
            self.ctx.clear_rect(0.0, 0.0, w, h);
            self.ctx.set_fill_style_str(color);
            self.ctx.fill_rect(0.0, 0.0, w, h);
        }
        self.ctx.restore();
        result.map_err(js_err)
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: &str) -> Result<(), SurfaceError> {
        self.disc_path(center, radius)?;
        self.ctx.set_fill_style_str(DEFAULT_COLOR);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, pen: Pen<'_>) -> Result<(), SurfaceError> {
        self.disc_path(center, radius)?;
        self.apply_pen(pen);
        self.ctx.stroke();
        Ok(())
    }

    fn stroke_segment(&mut self, from: Point, to: Point, pen: Pen<'_>) -> Result<(), SurfaceError> {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.apply_pen(pen);
        self.ctx.stroke();
        Ok(())
    }

    fn clip_disc(&mut self, center: Point, radius: f64) -> Result<(), SurfaceError> {
        self.disc_path(center, radius)?;
        self.ctx.clip();
        Ok(())
    }
}

impl Blit<WebSurface> for WebSurface {
    fn blit(&mut self, layer: &WebSurface, origin: Point) -> Result<(), SurfaceError> {
        self.ctx
            .draw_image_with_html_canvas_element(&layer.canvas, origin.x, origin.y)
            .map_err(js_err)
    }
}
