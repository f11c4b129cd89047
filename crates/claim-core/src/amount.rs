//! Unsigned big-integer parsing and display helpers.
//!
//! Upstream numeric fields arrive as strings (decimal, `0x` hex, or SDK
//! markers such as `"unlimited"`). Every helper here is total: a bad string
//! turns into a caller-chosen default, never an error.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::constants::UNLIMITED_CAP;

/// Parse a decimal or `0x`-prefixed hex string. Signs, whitespace and digit
/// separators are rejected.
pub fn parse_uint(raw: &str) -> Option<BigUint> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return BigUint::parse_bytes(hex.as_bytes(), 16);
    }
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(raw.as_bytes(), 10)
}

/// Parse an optional raw field. Absent or empty input yields `missing`,
/// unparseable input yields `invalid`.
pub fn uint_or(raw: Option<&str>, missing: u32, invalid: u32) -> BigUint {
    match raw {
        None | Some("") => BigUint::from(missing),
        Some(s) => parse_uint(s).unwrap_or_else(|| BigUint::from(invalid)),
    }
}

pub fn unlimited() -> BigUint {
    BigUint::from(UNLIMITED_CAP)
}

/// Narrow to `u32`, saturating at the display ceiling.
pub fn cap_to_u32(value: &BigUint) -> u32 {
    if *value >= unlimited() {
        return UNLIMITED_CAP;
    }
    value.to_u32().unwrap_or(UNLIMITED_CAP)
}

/// Render `value / 10^decimals` with at least one fractional digit and no
/// trailing zeros beyond it ("1.0", "0.02", "12.5").
pub fn format_units(value: &BigUint, decimals: u8) -> String {
    let digits = value.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return format!("{}.0", digits);
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{}.{}", whole, frac)
}
