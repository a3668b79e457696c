//! Numeric parsing for lab values.

use std::sync::LazyLock;

use regex::Regex;

/// Comma-grouped thousands, e.g. `1,234` or `-12,345.6`.
static GROUPED_THOUSANDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("Invalid thousands regex")
});

/// Parses a raw cell as a finite number.
///
/// Handles:
/// - Standard numbers: "123", "-45.67", "1.2e3"
/// - Thousands separators: "1,234,567", "1,234.5"
/// - Surrounding whitespace
///
/// A lone comma is not treated as a separator, so "4,2" does not become 42.
/// Empty, non-numeric, NaN and infinite values return `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed: f64 = if GROUPED_THOUSANDS.is_match(trimmed) {
        trimmed.replace(',', "").parse().ok()?
    } else {
        trimmed.parse().ok()?
    };
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_values() {
        assert_eq!(parse_number("123"), Some(123.0));
        assert_eq!(parse_number(" -0.5 "), Some(-0.5));
        assert_eq!(parse_number("1.2e3"), Some(1200.0));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_number("1,234.56"), Some(1234.56));
    }

    #[test]
    fn test_ambiguous_commas_rejected() {
        assert_eq!(parse_number("4,2"), None);
        assert_eq!(parse_number("12,34"), None);
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("<0.5"), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
