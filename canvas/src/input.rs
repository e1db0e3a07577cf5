//! Input model: modifier keys, mouse buttons, brush, and the gesture state machine.
//!
//! A gesture is decided on pointer-down and lasts until pointer-up: either a
//! pan (middle/right button, or primary with Shift/Alt held) or a draw
//! (primary button). The two never mix within one gesture.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use wire::{DEFAULT_COLOR, DEFAULT_SIZE};

use crate::camera::PanAnchor;
use crate::sync::StrokeSampler;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether a primary-button drag should pan instead of draw.
    #[must_use]
    pub fn pans(self) -> bool {
        self.shift || self.alt
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Color and width applied to new strokes.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub color: String,
    /// Line width in world units.
    pub size: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { color: DEFAULT_COLOR.to_owned(), size: DEFAULT_SIZE }
    }
}

/// What a pointer-down with `button` and `modifiers` starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Pan,
    Draw,
}

impl GestureKind {
    #[must_use]
    pub fn classify(button: Button, modifiers: Modifiers) -> Self {
        match button {
            Button::Middle | Button::Secondary => Self::Pan,
            Button::Primary if modifiers.pans() => Self::Pan,
            Button::Primary => Self::Draw,
        }
    }
}

/// Active gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the view. The offset is always derived from the anchor.
    Panning { anchor: PanAnchor },
    /// Drawing; the sampler tracks the last emitted world point.
    Drawing { sampler: StrokeSampler },
}
