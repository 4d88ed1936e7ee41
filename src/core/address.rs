//! Saudi free-text address parsing.
//!
//! Upstream systems send a single display string such as
//! `"Building No 1234, King Fahd Rd, P.C: 12345, Al Olaya Dist, Riyadh, Kingdom of Saudi Arabia"`.
//! Each field is extracted by its own pattern; a miss leaves the field empty.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured fields recovered from a display string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    /// "Building No 1234, <street>".
    pub address_line1: String,
    /// Four-digit building number.
    pub building_number: String,
    /// Five-digit postal code following "P.C:".
    pub pincode: String,
    /// Segment ending in a "Dist" token.
    pub district: String,
    /// Segment preceding ", Kingdom of Saudi Arabia".
    pub city: String,
}

impl ParsedAddress {
    /// True if no pattern matched.
    pub fn is_empty(&self) -> bool {
        self.address_line1.is_empty()
            && self.building_number.is_empty()
            && self.pincode.is_empty()
            && self.district.is_empty()
            && self.city.is_empty()
    }
}

struct Patterns {
    address_line1: Regex,
    building_number: Regex,
    pincode: Regex,
    district: Regex,
    city: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        address_line1: compile(r"(?i)Building\s+No\s+\d{4},\s*[^,]+"),
        building_number: compile(r"(?i)Building\s+No\s+(\d{4})"),
        pincode: compile(r"(?i)P\.C: *(\d{5})"),
        district: compile(r"(?i)([\w\s\-]*?Dist[\w\-]*)"),
        city: compile(r"(?i),([^,]+),\s*Kingdom of Saudi Arabia"),
    })
}

fn compile(pattern: &str) -> Regex {
    // Patterns are literals; a failure here is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid address pattern {pattern}: {e}"))
}

fn whole(re: &Regex, input: &str) -> String {
    re.find(input)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn group(re: &Regex, input: &str) -> String {
    re.captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse a free-text address display string.
///
/// Never fails: unmatched fields are returned as empty strings.
///
/// ```
/// use invoice_bridge::core::parse_address_display;
///
/// let parsed = parse_address_display(
///     "Building No 1234, King Fahd Rd, P.C: 12345, Al Olaya Dist, Riyadh, Kingdom of Saudi Arabia",
/// );
/// assert_eq!(parsed.building_number, "1234");
/// assert_eq!(parsed.city, "Riyadh");
/// ```
pub fn parse_address_display(display: &str) -> ParsedAddress {
    let p = patterns();
    ParsedAddress {
        address_line1: whole(&p.address_line1, display),
        building_number: group(&p.building_number, display),
        pincode: group(&p.pincode, display),
        district: group(&p.district, display),
        city: group(&p.city, display),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str =
        "Building No 1234, King Fahd Rd, P.C: 12345, Al Olaya Dist, Riyadh, Kingdom of Saudi Arabia";

    #[test]
    fn full_address() {
        let p = parse_address_display(FULL);
        assert_eq!(p.address_line1, "Building No 1234, King Fahd Rd");
        assert_eq!(p.building_number, "1234");
        assert_eq!(p.pincode, "12345");
        assert_eq!(p.district, "Al Olaya Dist");
        assert_eq!(p.city, "Riyadh");
    }

    #[test]
    fn no_markers() {
        let p = parse_address_display("PO Box 500, Jeddah");
        assert!(p.is_empty());
        assert_eq!(p, ParsedAddress::default());
    }

    #[test]
    fn case_insensitive() {
        let p = parse_address_display("building no 9876, Tahlia St, p.c:54321, kingdom of saudi arabia");
        assert_eq!(p.building_number, "9876");
        assert_eq!(p.address_line1, "building no 9876, Tahlia St");
        assert_eq!(p.pincode, "54321");
    }

    #[test]
    fn three_digit_building_number_is_ignored() {
        let p = parse_address_display("Building No 123, Main St");
        assert_eq!(p.building_number, "");
        assert_eq!(p.address_line1, "");
    }

    #[test]
    fn empty_input() {
        assert!(parse_address_display("").is_empty());
    }
}
