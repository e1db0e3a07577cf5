use super::*;
use crate::raster::Raster;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn small_ball() -> Ball {
    Ball { radius: 20.0 }
}

fn buffer() -> PersistentBuffer<Raster> {
    let ball = small_ball();
    let size = ball.world_size();
    PersistentBuffer::new(Raster::new(size, size), ball).unwrap()
}

fn stroke(from: (f64, f64), to: (f64, f64), color: &str, size: f64) -> Stroke {
    Stroke::new(from, to, color, size)
}

#[test]
fn new_rejects_wrong_layer_size() {
    let err = PersistentBuffer::new(Raster::new(100, 240), small_ball()).unwrap_err();
    assert!(matches!(
        err,
        SurfaceError::SizeMismatch { expected: 240, actual_w: 100, actual_h: 240 }
    ));
}

#[test]
fn prefill_is_white_disc_on_transparent() {
    let buf = buffer();
    let layer = buf.layer();
    assert_eq!(layer.pixel(120, 120), Some(WHITE));
    assert_eq!(layer.pixel(0, 0), Some(CLEAR));
    // 25 units right of center is outside a radius-20 ball.
    assert_eq!(layer.pixel(145, 120), Some(CLEAR));
    assert_eq!(buf.applied_count(), 0);
}

#[test]
fn origin_is_negative_half_world_size() {
    assert_eq!(buffer().origin(), Point::new(-120.0, -120.0));
}

#[test]
fn apply_translates_world_into_layer_space() {
    let mut buf = buffer();
    buf.apply(&stroke((0.0, 0.0), (10.0, 0.0), "#000000", 2.0)).unwrap();
    assert_eq!(buf.layer().pixel(125, 120), Some(BLACK));
    assert_eq!(buf.layer().pixel(125, 110), Some(WHITE));
    assert_eq!(buf.applied_count(), 1);
}

#[test]
fn strokes_outside_the_ball_still_land_in_the_margin() {
    let mut buf = buffer();
    buf.apply(&stroke((-100.0, -100.0), (-90.0, -100.0), "#ff0000", 2.0)).unwrap();
    assert_eq!(buf.layer().pixel(25, 20), Some([255, 0, 0, 255]));
}

#[test]
fn applying_twice_draws_twice() {
    let mut buf = buffer();
    let s = stroke((0.0, 5.0), (10.0, 5.0), "rgba(0, 0, 0, 0.5)", 2.0);
    buf.apply(&s).unwrap();
    let once = buf.layer().pixel(125, 124).unwrap();
    buf.apply(&s).unwrap();
    let twice = buf.layer().pixel(125, 124).unwrap();
    assert!(twice[0] < once[0], "second application should darken: {once:?} -> {twice:?}");
    assert_eq!(buf.applied_count(), 2);
}

#[test]
fn identical_sequences_give_identical_pixels() {
    let strokes = [
        stroke((-15.0, -3.0), (12.0, 8.0), "#ff0000", 3.0),
        stroke((12.0, 8.0), (0.0, 19.5), "rgba(0, 128, 255, 0.4)", 5.5),
        stroke((-30.0, 30.0), (30.0, -30.0), "#123456", 1.0),
        stroke((0.0, 0.0), (0.0, 0.0), "black", 7.0),
    ];
    let mut a = buffer();
    let mut b = buffer();
    for s in &strokes {
        a.apply(s).unwrap();
    }
    for s in &strokes {
        b.apply(s).unwrap();
    }
    assert_eq!(a.layer().image().as_raw(), b.layer().image().as_raw());
}

#[test]
fn reset_returns_to_the_prefilled_state() {
    let mut buf = buffer();
    buf.apply(&stroke((-10.0, 0.0), (10.0, 0.0), "#000000", 4.0)).unwrap();
    buf.reset().unwrap();
    assert_eq!(buf.applied_count(), 0);
    assert_eq!(buf.layer().image().as_raw(), buffer().layer().image().as_raw());
}
