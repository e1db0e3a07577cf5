use super::*;

// =============================================================
// Modifiers / Button
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.pans());
}

#[test]
fn shift_or_alt_pans() {
    assert!(Modifiers { shift: true, ..Default::default() }.pans());
    assert!(Modifiers { alt: true, ..Default::default() }.pans());
    assert!(!Modifiers { ctrl: true, meta: true, ..Default::default() }.pans());
}

#[test]
fn button_from_dom_codes() {
    assert_eq!(Button::from_dom(0), Some(Button::Primary));
    assert_eq!(Button::from_dom(1), Some(Button::Middle));
    assert_eq!(Button::from_dom(2), Some(Button::Secondary));
    assert_eq!(Button::from_dom(3), None);
    assert_eq!(Button::from_dom(-1), None);
}

// =============================================================
// GestureKind
// =============================================================

#[test]
fn primary_draws() {
    assert_eq!(GestureKind::classify(Button::Primary, Modifiers::default()), GestureKind::Draw);
}

#[test]
fn middle_and_secondary_pan() {
    assert_eq!(GestureKind::classify(Button::Middle, Modifiers::default()), GestureKind::Pan);
    assert_eq!(GestureKind::classify(Button::Secondary, Modifiers::default()), GestureKind::Pan);
}

#[test]
fn primary_with_pan_modifier_pans() {
    let shift = Modifiers { shift: true, ..Default::default() };
    assert_eq!(GestureKind::classify(Button::Primary, shift), GestureKind::Pan);
}

// =============================================================
// Brush / InputState
// =============================================================

#[test]
fn brush_default_matches_stroke_defaults() {
    let brush = Brush::default();
    assert_eq!(brush.color, DEFAULT_COLOR);
    assert!((brush.size - DEFAULT_SIZE).abs() < f64::EPSILON);
}

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}
