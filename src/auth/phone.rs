//! E.164 phone number validation

use regex::Regex;
use std::sync::OnceLock;

static E164: OnceLock<Regex> = OnceLock::new();

fn e164() -> &'static Regex {
    // Leading +, first digit 1-9, then 7 to 14 more digits.
    E164.get_or_init(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern compiles"))
}

/// Check a phone number against E.164. The caller trims whitespace first;
/// no other normalization is applied.
pub fn is_valid_phone(phone: &str) -> bool {
    e164().is_match(phone)
}
