//! Display formatting for raw record values.
//!
//! # Responsibility
//! - Turn stored timestamps and nullable scalars into display strings.
//! - Never fail: malformed input degrades to the raw value.
//!
//! # Invariants
//! - `None` and empty input render as [`NOT_SPECIFIED`].
//! - A value that does not parse as a timestamp is returned unchanged.
//! - Offsets are kept as written; the wall-clock time of the stored value
//!   is what gets displayed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Placeholder used for every missing display value.
pub const NOT_SPECIFIED: &str = "Not specified";

const DATE_TIME_PATTERN: &str = "%A, %B %d, %Y at %I:%M %p";
const DATE_PATTERN: &str = "%B %d, %Y";
const FILE_DATE_PATTERN: &str = "%Y-%m-%d";

/// Formats a timestamp as `Tuesday, March 05, 2024 at 02:30 PM`.
pub fn format_date_time(value: Option<&str>) -> String {
    format_with(value, DATE_TIME_PATTERN)
}

/// Formats a timestamp as `March 05, 2024`.
pub fn format_date(value: Option<&str>) -> String {
    format_with(value, DATE_PATTERN)
}

/// Formats a timestamp as `2024-03-05` for file names.
///
/// Returns `None` when the value is missing or unparseable, so callers can
/// pick their own fallback.
pub fn file_date(value: Option<&str>) -> Option<String> {
    let raw = value.map(str::trim).filter(|raw| !raw.is_empty())?;
    parse_timestamp(raw).map(|parsed| parsed.format(FILE_DATE_PATTERN).to_string())
}

/// Returns the stringified value, or [`NOT_SPECIFIED`] for `None`/empty.
pub fn display_or_default<T: ToString>(value: Option<T>) -> String {
    match value.map(|inner| inner.to_string()) {
        Some(text) if !text.is_empty() => text,
        _ => NOT_SPECIFIED.to_string(),
    }
}

/// Returns whether optional free text carries anything besides whitespace.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

/// Parses the ISO-8601-like timestamps found in the notes database.
///
/// Accepts RFC 3339 (`Z` or numeric offsets), `T` or space separators,
/// optional seconds and fractions, and bare dates (read as midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    let normalized = value.replacen(' ', "T", 1);

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.naive_local());
    }
    if let Ok(parsed) = normalized.parse::<NaiveDateTime>() {
        return Some(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M") {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z") {
        return Some(parsed.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn format_with(value: Option<&str>, pattern: &str) -> String {
    let Some(raw) = value.filter(|raw| !raw.is_empty()) else {
        return NOT_SPECIFIED.to_string();
    };

    match parse_timestamp(raw) {
        Some(parsed) => parsed.format(pattern).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        display_or_default, file_date, format_date, format_date_time, has_text, parse_timestamp,
        NOT_SPECIFIED,
    };

    #[test]
    fn format_date_handles_missing_values() {
        assert_eq!(format_date(None), NOT_SPECIFIED);
        assert_eq!(format_date(Some("")), NOT_SPECIFIED);
        assert_eq!(format_date(Some("   ")), "   ");
    }

    #[test]
    fn format_date_renders_zero_padded_day() {
        assert_eq!(format_date(Some("2024-03-05T00:00:00Z")), "March 05, 2024");
        assert_eq!(format_date(Some("2024-03-05")), "March 05, 2024");
    }

    #[test]
    fn format_date_time_uses_twelve_hour_clock() {
        assert_eq!(
            format_date_time(Some("2024-03-05T14:30:00Z")),
            "Tuesday, March 05, 2024 at 02:30 PM"
        );
        assert_eq!(
            format_date_time(Some("2024-03-05 09:05:00")),
            "Tuesday, March 05, 2024 at 09:05 AM"
        );
    }

    #[test]
    fn format_date_time_keeps_stored_wall_clock_for_offsets() {
        assert_eq!(
            format_date_time(Some("2024-03-05T14:30:00-05:00")),
            "Tuesday, March 05, 2024 at 02:30 PM"
        );
    }

    #[test]
    fn malformed_timestamps_pass_through_unchanged() {
        assert_eq!(format_date(Some("sometime in May")), "sometime in May");
        assert_eq!(format_date_time(Some("2024-13-45")), "2024-13-45");
    }

    #[test]
    fn parse_timestamp_accepts_sqlite_variants() {
        assert!(parse_timestamp("2024-03-05 14:30:00.123").is_some());
        assert!(parse_timestamp("2024-03-05T14:30").is_some());
        assert!(parse_timestamp("2024-03-05T14:30:00.5Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn file_date_is_none_for_unparseable_input() {
        assert_eq!(
            file_date(Some("2024-03-05T14:30:00Z")).as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(file_date(Some("soon")), None);
        assert_eq!(file_date(None), None);
    }

    #[test]
    fn display_or_default_stringifies_values() {
        assert_eq!(display_or_default(Some(7)), "7");
        assert_eq!(display_or_default(Some("F41.1")), "F41.1");
        assert_eq!(display_or_default(Some("")), NOT_SPECIFIED);
        assert_eq!(display_or_default(Some("  ")), "  ");
        assert_eq!(display_or_default::<&str>(None), NOT_SPECIFIED);
    }

    #[test]
    fn has_text_ignores_whitespace() {
        assert!(has_text(Some("note")));
        assert!(!has_text(Some(" \n ")));
        assert!(!has_text(None));
    }
}
