//! Timestamp parsing against the documented ISO-8601 forms.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use assent_contracts::{AssentError, AssentResult, Period};

/// Parse a timestamp string into a UTC instant.
///
/// Accepted forms are documented at the crate root. With `strict` (the
/// engine default) an unsuffixed datetime is rejected; in lenient mode it is
/// read as UTC.
pub fn parse_instant(value: &str, strict: bool) -> AssentResult<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        // Date-only periods are conventional for consent windows; midnight
        // UTC is the documented interpretation.
        let t = d
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| timestamp_error(value, "invalid time of day"))?;
        return Ok(t.and_utc());
    }
    if !strict {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
            debug!(value, "accepted unsuffixed timestamp as UTC (lenient mode)");
            return Ok(t.and_utc());
        }
    }
    Err(timestamp_error(
        value,
        if strict {
            "expected RFC 3339 with Z or offset, or a YYYY-MM-DD date"
        } else {
            "expected RFC 3339, a YYYY-MM-DD date, or an unsuffixed datetime"
        },
    ))
}

/// Parse a pair of timestamps into a validated `Period`.
pub fn parse_period(start: &str, end: &str, strict: bool) -> AssentResult<Period> {
    let start = parse_instant(start, strict)?;
    let end = parse_instant(end, strict)?;
    Period::new(start, end)
}

/// The current wall-clock instant as UTC. Production callers pass this into
/// `validate`; tests pass fixed instants instead.
pub fn wall_clock_now() -> DateTime<Utc> {
    Utc::now()
}

/// True when `instant` lies within `period` (closed on both ends).
pub fn within_period(instant: DateTime<Utc>, period: &Period) -> bool {
    period.contains(instant)
}

fn timestamp_error(value: &str, detail: &str) -> AssentError {
    AssentError::TimestampParse {
        value: value.to_string(),
        detail: detail.to_string(),
    }
}
