//! Parsing of provider observation timestamps.
//!
//! Open-Meteo reports `current_weather.time` as ISO-8601 with minute precision
//! and, depending on the request, with or without an offset
//! (`2024-05-01T11:00Z` vs `2024-05-01T11:00`). Formats are tried in order;
//! a string without any offset is taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::TimestampError;

/// Offset-qualified formats tried after RFC 3339. `%#z` accepts `Z`, `+02`, `+0200` and `+02:00`.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Local date-time formats, read as UTC.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse_observation_time(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = input.trim();

    parse_with_offset(s)
        .or_else(|| parse_local_as_utc(s))
        .ok_or_else(|| TimestampError {
            input: input.to_string(),
        })
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_local_as_utc(s: &str) -> Option<DateTime<Utc>> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.and_utc())
}
