//! Date helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

/// `"January 5, 2024"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `"1:05:09 PM"`, the en-US long time format used by the clock page.
pub fn format_time<T: Timelike>(time: &T) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02}:{:02} {}",
        hour,
        time.minute(),
        time.second(),
        if is_pm { "PM" } else { "AM" }
    )
}

/// Parse an RFC 3339 timestamp, an ISO `YYYY-MM-DDTHH:MM:SS` or a plain
/// `YYYY-MM-DD` into a calendar date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

/// How long before `now` the instant `date` was, in words.
///
/// Under a minute (including instants in the future) is `"just now"`; beyond
/// that the largest whole unit of minutes, hours or days is used.
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    plural(hours / 24, "day")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
