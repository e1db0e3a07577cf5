#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn viewport() -> Viewport {
    Viewport::sized(1000.0, 1000.0, 1.0)
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_distance() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

// --- Defaults ---

#[test]
fn camera_default_is_unit_scale_zero_offset() {
    let cam = Camera::default();
    assert_eq!(cam.scale, 1.0);
    assert_eq!(cam.offset, Point::new(0.0, 0.0));
}

#[test]
fn ball_default_world_size() {
    assert_eq!(Ball::default().world_size(), 4200);
}

#[test]
fn viewport_device_size_applies_dpr() {
    let vp = Viewport::sized(400.0, 300.0, 2.0);
    assert_eq!(vp.device_size(), (800, 600));
}

// --- to_world / to_screen ---

#[test]
fn to_world_viewport_center_is_origin() {
    let cam = Camera::default();
    let world = cam.to_world(&viewport(), Point::new(500.0, 500.0));
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn to_world_subtracts_canvas_origin() {
    let cam = Camera::default();
    let vp = Viewport { left: 40.0, top: 60.0, width: 200.0, height: 100.0, dpr: 1.0 };
    let world = cam.to_world(&vp, Point::new(140.0, 110.0));
    assert!(point_approx_eq(world, Point::new(0.0, 0.0)));
}

#[test]
fn to_world_divides_by_scale_then_subtracts_offset() {
    let cam = Camera { scale: 2.0, offset: Point::new(10.0, -5.0) };
    let world = cam.to_world(&viewport(), Point::new(600.0, 300.0));
    // (100 / 2) - 10 = 40, (-200 / 2) + 5 = -95
    assert!(point_approx_eq(world, Point::new(40.0, -95.0)));
}

#[test]
fn to_world_ignores_device_pixel_ratio() {
    let cam = Camera { scale: 1.5, offset: Point::new(3.0, 4.0) };
    let lo = Viewport::sized(800.0, 600.0, 1.0);
    let hi = Viewport::sized(800.0, 600.0, 3.0);
    let p = Point::new(123.0, 456.0);
    assert!(point_approx_eq(cam.to_world(&lo, p), cam.to_world(&hi, p)));
}

#[test]
fn round_trip_screen_first() {
    let cam = Camera { scale: 0.75, offset: Point::new(13.7, -42.3) };
    let vp = Viewport { left: 12.0, top: 30.0, width: 640.0, height: 480.0, dpr: 2.0 };
    let screen = Point::new(400.0, 300.0);
    let back = cam.to_screen(&vp, cam.to_world(&vp, screen));
    assert!(point_approx_eq(screen, back));
}

// --- zoom ---

#[test]
fn zoom_scenario_scroll_up_at_500_500() {
    let mut cam = Camera::default();
    let vp = Viewport::sized(800.0, 600.0, 1.0);
    let cursor = Point::new(500.0, 500.0);
    let before = cam.to_world(&vp, cursor);

    assert!(cam.zoom_at(&vp, cursor, -100.0));

    assert!(approx_eq(cam.scale, 1.15));
    assert!(point_approx_eq(cam.to_world(&vp, cursor), before));
    assert!(cam.offset != Point::new(0.0, 0.0));
}

#[test]
fn zoom_scroll_down_zooms_out() {
    let mut cam = Camera::default();
    assert!(cam.zoom_at(&viewport(), Point::new(10.0, 10.0), 100.0));
    assert!(cam.scale < 1.0);
}

#[test]
fn zoom_keeps_cursor_world_point_fixed_across_grid() {
    let vp = Viewport { left: 25.0, top: 15.0, width: 900.0, height: 700.0, dpr: 2.0 };
    let scales = [0.2, 0.35, 1.0, 2.7, 5.0];
    let deltas = [-400.0, -100.0, -3.0, 3.0, 100.0, 400.0];
    let cursors = [Point::new(25.0, 15.0), Point::new(300.0, 600.0), Point::new(925.0, 715.0)];

    for &scale in &scales {
        for &delta in &deltas {
            for &cursor in &cursors {
                let mut cam = Camera { scale, offset: Point::new(-120.0, 77.5) };
                let before = cam.to_world(&vp, cursor);
                cam.zoom_at(&vp, cursor, delta);
                let after = cam.to_world(&vp, cursor);
                assert!(
                    (before.x - after.x).abs() < 1e-6 && (before.y - after.y).abs() < 1e-6,
                    "scale={scale} delta={delta} cursor={cursor:?}"
                );
            }
        }
    }
}

#[test]
fn repeated_zoom_in_never_exceeds_max() {
    let mut cam = Camera::default();
    for _ in 0..200 {
        cam.zoom_at(&viewport(), Point::new(100.0, 100.0), -5000.0);
        assert!(cam.scale <= MAX_SCALE);
    }
    assert_eq!(cam.scale, MAX_SCALE);
}

#[test]
fn repeated_zoom_out_never_drops_below_min() {
    let mut cam = Camera::default();
    for _ in 0..200 {
        cam.zoom_at(&viewport(), Point::new(100.0, 100.0), 5000.0);
        assert!(cam.scale >= MIN_SCALE);
    }
    assert_eq!(cam.scale, MIN_SCALE);
}

#[test]
fn zoom_at_bound_reports_no_change() {
    let mut cam = Camera { scale: MAX_SCALE, offset: Point::new(1.0, 2.0) };
    assert!(!cam.zoom_at(&viewport(), Point::new(0.0, 0.0), -100.0));
    assert_eq!(cam.offset, Point::new(1.0, 2.0));
}

#[test]
fn clamp_scale_handles_non_finite() {
    assert_eq!(clamp_scale(f64::NAN), MIN_SCALE);
    assert_eq!(clamp_scale(f64::INFINITY), MIN_SCALE);
    assert_eq!(clamp_scale(-3.0), MIN_SCALE);
    assert_eq!(clamp_scale(9.0), MAX_SCALE);
}

// --- pan ---

#[test]
fn pan_moves_grabbed_world_point_with_cursor() {
    let vp = viewport();
    let mut cam = Camera { scale: 2.0, offset: Point::new(5.0, 5.0) };
    let grab = Point::new(300.0, 400.0);
    let grabbed_world = cam.to_world(&vp, grab);
    let anchor = cam.pan_anchor(grab);

    let release = Point::new(350.0, 380.0);
    cam.pan_to(&anchor, release);

    assert!(point_approx_eq(cam.to_world(&vp, release), grabbed_world));
}

#[test]
fn pan_is_computed_from_anchor_not_accumulated() {
    let mut cam = Camera { scale: 0.5, offset: Point::new(0.0, 0.0) };
    let anchor = cam.pan_anchor(Point::new(0.0, 0.0));
    for i in 1..=1000 {
        cam.pan_to(&anchor, Point::new(f64::from(i) * 0.1, 0.0));
    }
    assert!(approx_eq(cam.offset.x, 200.0));
    assert!(approx_eq(cam.offset.y, 0.0));
}

// --- fit / transform ---

#[test]
fn fit_ball_shows_whole_ball_when_possible() {
    let vp = Viewport::sized(4400.0, 3000.0, 1.0);
    let cam = Camera::fit_ball(&vp, &Ball::default());
    assert!(approx_eq(cam.scale, 3000.0 / 4200.0));
    assert_eq!(cam.offset, Point::new(0.0, 0.0));
}

#[test]
fn fit_ball_clamps_small_viewports() {
    let cam = Camera::fit_ball(&Viewport::sized(320.0, 480.0, 1.0), &Ball::default());
    assert_eq!(cam.scale, MIN_SCALE);
}

#[test]
fn view_transform_maps_world_to_device_pixels() {
    let vp = Viewport { left: 50.0, top: 50.0, width: 400.0, height: 300.0, dpr: 2.0 };
    let cam = Camera { scale: 1.5, offset: Point::new(-10.0, 20.0) };
    let world = Point::new(33.0, -7.0);
    let device = cam.view_transform(&vp).apply(world);
    let screen = cam.to_screen(&vp, world);
    assert!(approx_eq(device.x, (screen.x - vp.left) * vp.dpr));
    assert!(approx_eq(device.y, (screen.y - vp.top) * vp.dpr));
}

#[test]
fn visible_world_spans_viewport() {
    let cam = Camera { scale: 2.0, offset: Point::new(0.0, 0.0) };
    let (min, max) = cam.visible_world(&Viewport::sized(400.0, 200.0, 1.0));
    assert!(point_approx_eq(min, Point::new(-100.0, -50.0)));
    assert!(point_approx_eq(max, Point::new(100.0, 50.0)));
}
