use num_bigint::BigUint;
use serde::Serialize;

use crate::amount::{parse_uint, unlimited};

/// Supply counter strings as rendered next to "minted".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupplySummary {
    pub number_claimed: String,
    /// Empty when the collection is effectively unlimited.
    pub number_total: String,
}

impl SupplySummary {
    /// "12 / 100 minted", or "12 minted" for unlimited collections.
    pub fn label(&self) -> String {
        if self.number_total.is_empty() {
            format!("{} minted", self.number_claimed)
        } else {
            format!("{} / {} minted", self.number_claimed, self.number_total)
        }
    }
}

pub fn claimed_supply(raw: Option<&str>) -> BigUint {
    raw.and_then(parse_uint).unwrap_or_default()
}

/// Remaining supply of the active condition. Missing or unparseable values
/// (including the SDK's `"unlimited"`) count as the display ceiling.
pub fn available_supply(raw: Option<&str>) -> BigUint {
    raw.and_then(parse_uint).unwrap_or_else(unlimited)
}

pub fn aggregate(claimed_raw: Option<&str>, available_raw: Option<&str>) -> SupplySummary {
    let claimed = claimed_supply(claimed_raw);
    let total = available_supply(available_raw) + &claimed;
    SupplySummary {
        number_claimed: claimed.to_str_radix(10),
        number_total: if total >= unlimited() {
            String::new()
        } else {
            total.to_str_radix(10)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_bounded_collection() {
        let s = aggregate(Some("12"), Some("88"));
        assert_eq!(s.number_claimed, "12");
        assert_eq!(s.number_total, "100");
        assert_eq!(s.label(), "12 / 100 minted");
    }

    #[test]
    fn test_aggregate_unlimited_hides_total() {
        let s = aggregate(Some("3"), Some("999997"));
        assert_eq!(s.number_total, "");
        assert_eq!(s.label(), "3 minted");
        let s = aggregate(Some("3"), Some("999996"));
        assert_eq!(s.number_total, "999999");
    }

    #[test]
    fn test_aggregate_malformed_inputs() {
        for bad in [None, Some(""), Some("unlimited"), Some("-4"), Some("0xg")] {
            let s = aggregate(bad, bad);
            assert_eq!(s.number_claimed, "0");
            assert_eq!(s.number_total, "");
        }
    }

    #[test]
    fn test_aggregate_sold_out_strings_match() {
        let s = aggregate(Some("100"), Some("0"));
        assert_eq!(s.number_claimed, s.number_total);
    }

    #[test]
    fn test_aggregate_hex_claimed() {
        let s = aggregate(Some("0x0a"), Some("5"));
        assert_eq!(s.number_claimed, "10");
        assert_eq!(s.number_total, "15");
    }
}
