use super::*;

#[test]
fn short_hex() {
    assert_eq!(parse("#f80"), Some([255, 136, 0, 255]));
}

#[test]
fn short_hex_with_alpha() {
    assert_eq!(parse("#0008"), Some([0, 0, 0, 136]));
}

#[test]
fn long_hex() {
    assert_eq!(parse("#1e1e24"), Some([30, 30, 36, 255]));
}

#[test]
fn long_hex_with_alpha() {
    assert_eq!(parse("#ff000080"), Some([255, 0, 0, 128]));
}

#[test]
fn hex_with_bad_length_or_digits_is_rejected() {
    assert_eq!(parse("#12345"), None);
    assert_eq!(parse("#ggg"), None);
    assert_eq!(parse("#"), None);
}

#[test]
fn rgb_function() {
    assert_eq!(parse("rgb(10, 20, 30)"), Some([10, 20, 30, 255]));
}

#[test]
fn rgba_function_scales_alpha() {
    assert_eq!(parse("rgba(255, 255, 255, 0.08)"), Some([255, 255, 255, 20]));
    assert_eq!(parse("RGBA(0,0,0,0)"), Some([0, 0, 0, 0]));
}

#[test]
fn rgb_function_clamps_channels() {
    assert_eq!(parse("rgb(300, -5, 12.6)"), Some([255, 0, 13, 255]));
}

#[test]
fn rgb_function_with_wrong_arity_is_rejected() {
    assert_eq!(parse("rgb(1, 2)"), None);
    assert_eq!(parse("rgb(1, 2, x)"), None);
}

#[test]
fn named_colors_are_case_insensitive() {
    assert_eq!(parse("White"), Some([255, 255, 255, 255]));
    assert_eq!(parse(" red "), Some([255, 0, 0, 255]));
}

#[test]
fn unknown_color_falls_back_to_black() {
    assert_eq!(parse("chartreuse-ish"), None);
    assert_eq!(parse_or_black("chartreuse-ish"), BLACK);
}

#[test]
fn hex_with_non_ascii_is_rejected() {
    assert_eq!(parse("#é12"), None);
    assert_eq!(parse("#ffé"), None);
}

#[test]
fn stroke_color_keeps_what_parses() {
    assert_eq!(stroke_color("#ff0000"), "#ff0000");
    assert_eq!(stroke_color("rgba(0, 0, 255, 0.6)"), "rgba(0, 0, 255, 0.6)");
}

#[test]
fn stroke_color_resolves_unknown_input_to_the_default() {
    assert_eq!(stroke_color("bogus"), wire::DEFAULT_COLOR);
    assert_eq!(stroke_color(""), wire::DEFAULT_COLOR);
}
