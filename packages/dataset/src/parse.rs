//! Shared value parsing for the normalizer.
//!
//! Raw property bags carry timestamps as ISO strings, naive datetime
//! strings, or epoch milliseconds depending on which sheet the record came
//! from, so parsing tries each form in turn.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _, Utc};
use serde_json::Value;

/// Parses a raw JSON value into an instant.
///
/// Strings are tried as RFC 3339, then naive datetime (`T` or space
/// separated, optional fractional seconds, interpreted as UTC), then bare
/// dates at midnight. Numbers are epoch milliseconds. The string `"nat"` in
/// any letter case marks an absent value and parses to `None`, not an error.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nat") {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    None
}

/// Returns the trimmed string if the value is a non-empty string.
pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        _ => None,
    }
}
