//! Wall-clock formatting for report cells
//!
//! All helpers take local wall-clock times; callers convert from UTC first.

use chrono::{DateTime, Local, NaiveDateTime, Timelike, Utc};

/// UTC instant to local wall-clock time
pub fn to_local(at: DateTime<Utc>) -> NaiveDateTime {
    at.with_timezone(&Local).naive_local()
}

/// "YYYY-MM-DD"
pub fn format_date(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// "HH:MM", 24-hour
pub fn format_time_24(at: NaiveDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// "HH:MMam" / "HH:MMpm". Midnight and noon read as 12.
pub fn format_time_12(at: NaiveDateTime) -> String {
    let (is_pm, hour) = at.hour12();
    let suffix = if is_pm { "pm" } else { "am" };
    format!("{:02}:{:02}{}", hour, at.minute(), suffix)
}

/// "HH:MM-HH:MM"
pub fn time_range_24(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{}-{}", format_time_24(start), format_time_24(end))
}

/// "HH:MMam – HH:MMpm"
pub fn time_range_12(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!("{} – {}", format_time_12(start), format_time_12(end))
}
