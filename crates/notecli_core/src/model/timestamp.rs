//! Formatted timestamps for note records.
//!
//! Timestamps are RFC 3339 UTC strings with a fixed microsecond precision
//! (`2026-10-16T09:30:00.123456Z`), so string order equals time order.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Returns the current instant as a formatted timestamp.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now().trunc_subsecs(6))
}

/// Returns a timestamp strictly later than `previous`.
///
/// Uses the current instant when the clock has advanced past `previous`,
/// otherwise `previous` plus one microsecond. An unparseable `previous`
/// yields the current instant.
pub fn timestamp_after(previous: &str) -> String {
    let now = Utc::now().trunc_subsecs(6);
    let next = match parse_timestamp(previous) {
        Some(prev) if prev >= now => prev + Duration::microseconds(1),
        _ => now,
    };
    format_timestamp(next)
}

/// Parses a timestamp produced by this module.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}
