//! Date normalization to ISO 8601.
//!
//! Lab exports use day-first dates almost exclusively, so ambiguous
//! `dd/mm/yyyy` input is read day-first.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Two-digit year variants come first: `%Y` would accept "24" as year 24.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

/// Normalizes a date or datetime string to ISO 8601.
///
/// Datetimes at midnight collapse to a plain date. Returns `None` when the
/// value is empty or matches no known format.
pub fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        if dt.time().num_seconds_from_midnight() == 0 {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
        return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(normalize_date("2024-03-05").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn test_day_first_formats() {
        assert_eq!(normalize_date("05/03/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("5.3.2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("05-Mar-2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("5 March 2024").as_deref(), Some("2024-03-05"));
        assert_eq!(normalize_date("05/03/24").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn test_datetimes() {
        assert_eq!(
            normalize_date("2024-03-05 00:00:00").as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(
            normalize_date("05/03/2024 14:20").as_deref(),
            Some("2024-03-05T14:20:00")
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("autumn"), None);
        assert_eq!(normalize_date("31/02/2024"), None);
    }
}
