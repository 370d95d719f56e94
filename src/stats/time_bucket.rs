//! Local-time day bucketing
//!
//! Actions are stored as UTC instants but grouped by the calendar day of
//! the machine running the server.
//! - Day buckets: "YYYY-MM-DD" in local time

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Local calendar date of an instant
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Compute the day bucket string of an instant.
///
/// Returns a string in format "YYYY-MM-DD".
///
/// # Example
/// ```ignore
/// let bucket = local_day_bucket(action.user_start_time);
/// assert_eq!(bucket.len(), 10);
/// ```
pub fn local_day_bucket(at: DateTime<Utc>) -> String {
    local_date(at).format("%Y-%m-%d").to_string()
}

/// Today's local date
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a day bucket string back to a date.
pub fn parse_day_bucket(bucket: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(bucket.trim(), "%Y-%m-%d").ok()
}

/// First instant of a local day, as UTC
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date, NaiveTime::MIN)
}

/// Last millisecond of a local day, as UTC
pub fn local_day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_to_utc(date, end)
}

fn local_to_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    // DST gaps have no local mapping; fall back to reading the wall time as UTC
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
