// Window sizes, rollup selection and timestamp parsing for metrics queries

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Rollups (seconds) offered by the metrics API, smallest first.
const ROLLUPS: [i64; 5] = [1, 5, 60, 300, 3600];
/// The API returns at most this many points per series.
const MAX_POINTS: i64 = 600;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = "YYYY-MM-DD".len();
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum TimeframeError {
    #[error("invalid duration {input:?}: {source}")]
    InvalidDuration {
        input: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("duration {0:?} must be greater than zero")]
    ZeroDuration(String),
    #[error("invalid timestamp {input:?}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("rollup is too large for API call, maximum call size is 25 days (window {0} ms)")]
    WindowTooLarge(i64),
}

/// Parses a human duration (`"60s"`, `"5m"`, `"1h"`) into milliseconds.
pub fn parse_window(s: &str) -> Result<i64, TimeframeError> {
    let duration =
        humantime::parse_duration(s).map_err(|source| TimeframeError::InvalidDuration {
            input: s.to_string(),
            source,
        })?;
    let ms = duration.as_millis() as i64;
    if ms == 0 {
        return Err(TimeframeError::ZeroDuration(s.to_string()));
    }
    Ok(ms)
}

/// Smallest rollup that keeps a window of `window_ms` within the API's point limit.
pub fn rollup_for_window(window_ms: i64) -> Result<i64, TimeframeError> {
    let needed = window_ms / 1000 / MAX_POINTS;
    ROLLUPS
        .into_iter()
        .find(|r| needed <= *r)
        .ok_or(TimeframeError::WindowTooLarge(window_ms))
}

/// Parses `YYYY-MM-DD HH:MM:SS` (UTC) into epoch milliseconds. A bare date means midnight.
pub fn parse_timestamp(s: &str) -> Result<i64, TimeframeError> {
    let s = s.trim();
    let parsed = if s.len() == DATE_LEN {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.and_time(NaiveTime::MIN))
    } else {
        NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
    };
    parsed
        .map(|dt| dt.and_utc().timestamp() * 1000)
        .map_err(|source| TimeframeError::InvalidTimestamp {
            input: s.to_string(),
            source,
        })
}

/// Current time in epoch milliseconds, truncated to the second.
pub fn now_ms() -> i64 {
    Utc::now().timestamp() * 1000
}
