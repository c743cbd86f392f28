//! Timestamp and number helpers shared by sources and renderers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Naive layouts the dashboard backend has written over time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the naive layouts in [`NAIVE_FORMATS`]; naive values
/// carry no offset and are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Round to a fixed number of decimal places, half away from zero.
///
/// Every reported figure goes through here so all reports agree.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Share of `part` in `total` as a percentage with one decimal.
pub fn percentage(part: usize, total: usize) -> f64 {
    round_to(ratio(part as f64, total as f64) * 100.0, 1)
}

/// Format a token count for display (e.g., "14.2M").
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

/// Format minutes for display (e.g., "2h 5m").
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as i64;
    let hours = total / 60;
    let mins = total % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_and_naive() {
        let ts = parse_timestamp("2025-03-04T10:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);

        let ts = parse_timestamp("2025-03-04 10:30:00.123456").unwrap();
        assert_eq!((ts.day(), ts.hour(), ts.minute()), (4, 10, 30));

        let ts = parse_timestamp("2025-03-04T23:59:59").unwrap();
        assert_eq!(ts.day(), 4);

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(69.25, 2), 69.25);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
        assert_eq!(round_to(33.333, 1), 33.3);
        assert_eq!(round_to(0.25, 1), 0.3);
        assert_eq!(round_to(f64::NAN, 1), 0.0);
    }

    #[test]
    fn test_ratio_and_percentage_guard_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(format_tokens(14_200_000), "14.2M");
        assert_eq!(format_tokens(850), "850");
        assert_eq!(format_minutes(125.4), "2h 5m");
        assert_eq!(format_minutes(-3.0), "0m");
    }
}
