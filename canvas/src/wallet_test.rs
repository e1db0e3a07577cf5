use super::*;

const ADDRESS: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

#[test]
fn accepts_a_base58_key() {
    assert_eq!(normalize_address(ADDRESS).as_deref(), Some(ADDRESS));
}

#[test]
fn trims_surrounding_whitespace() {
    assert_eq!(normalize_address(&format!("  {ADDRESS}\n")).as_deref(), Some(ADDRESS));
}

#[test]
fn rejects_empty_and_short() {
    assert_eq!(normalize_address(""), None);
    assert_eq!(normalize_address("   "), None);
    assert_eq!(normalize_address("9xQeWvG816bUx9EP"), None);
}

#[test]
fn rejects_characters_outside_base58() {
    // '0', 'O', 'I' and 'l' are not in the alphabet.
    let with_zero = ADDRESS.replacen('9', "0", 1);
    assert_eq!(normalize_address(&with_zero), None);
    let with_l = ADDRESS.replacen('x', "l", 1);
    assert_eq!(normalize_address(&with_l), None);
}

#[test]
fn rejects_overlong() {
    assert_eq!(normalize_address(&format!("{ADDRESS}{ADDRESS}")), None);
}
