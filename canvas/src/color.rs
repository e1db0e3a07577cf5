//! CSS color parsing for the software rasterizer.
//!
//! Supports the forms strokes and the compositor actually use: hex
//! (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()` with an alpha
//! in `0..=1`, and a short list of named colors.

use wire::DEFAULT_COLOR;

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Straight (non-premultiplied) RGBA.
pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];

const NAMED: &[(&str, Rgba)] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("pink", [255, 192, 203, 255]),
    ("brown", [165, 42, 42, 255]),
    ("transparent", [0, 0, 0, 0]),
];

/// Parse a CSS color string.
#[must_use]
pub fn parse(input: &str) -> Option<Rgba> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower.strip_prefix("rgba(").or_else(|| lower.strip_prefix("rgb(")) {
        return parse_functional(args.strip_suffix(')')?);
    }
    NAMED.iter().find(|(name, _)| *name == lower).map(|(_, rgba)| *rgba)
}

/// Parse a CSS color string, falling back to opaque black.
#[must_use]
pub fn parse_or_black(input: &str) -> Rgba {
    parse(input).unwrap_or(BLACK)
}

/// The color a stroke is painted with: `input` when it parses, otherwise
/// the wire default. Every backend paints the resolved value.
#[must_use]
pub fn stroke_color(input: &str) -> &str {
    if parse(input).is_some() { input } else { DEFAULT_COLOR }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.as_bytes();
    let nibble = |i: usize| hex_digit(digits[i]).map(|v| v * 17);
    let byte = |i: usize| Some((hex_digit(digits[i])? << 4) | hex_digit(digits[i + 1])?);
    match digits.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 255]),
        4 => Some([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn number(s: &str) -> Option<f64> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| number(s).map(|v| v.round().clamp(0.0, 255.0) as u8);
    let alpha = match parts.get(3) {
        Some(s) => (number(s)?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}
