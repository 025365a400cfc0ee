use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("time_range must be two timestamps joined by '_', got '{0}'")]
    BadShape(String),
    #[error("invalid timestamp '{0}': {1}")]
    BadTimestamp(String, String),
    #[error("time_range FROM must be <= TO")]
    FromAfterTo,
    #[error("aggregate time_range span must be <= 10 minutes")]
    SpanTooLong,
    #[error("aggregate time_range boundaries must be minute-aligned")]
    NotMinuteAligned,
}

/// A `FROM_TO` range parsed from the millisecond-precision layout used
/// by `/user_profiles` (spec §4.2): `YYYY-MM-DDTHH:MM:SS.sss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillisTimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl MillisTimeRange {
    const FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn parse(raw: &str) -> Result<Self, TimeRangeError> {
        let (from_raw, to_raw) = split_once(raw)?;
        let from = parse_naive(from_raw, Self::FORMAT)?;
        let to = parse_naive(to_raw, Self::FORMAT)?;
        if from > to {
            return Err(TimeRangeError::FromAfterTo);
        }
        Ok(Self { from, to })
    }

    /// `FROM <= t < TO`, half-open per spec §4.2.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from <= t && t < self.to
    }
}

/// A `FROM_TO` range parsed from the second-precision layout used by
/// `/aggregates` (spec §4.3): `YYYY-MM-DDTHH:MM:SS`, validated to be
/// minute-aligned and span at most 10 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteTimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl MinuteTimeRange {
    const FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S";
    const MAX_SPAN_SECONDS: i64 = 10 * 60;

    pub fn parse(raw: &str) -> Result<Self, TimeRangeError> {
        let (from_raw, to_raw) = split_once(raw)?;
        let from = parse_naive(from_raw, Self::FORMAT)?;
        let to = parse_naive(to_raw, Self::FORMAT)?;
        if from > to {
            return Err(TimeRangeError::FromAfterTo);
        }
        if from.timestamp() % 60 != 0 || to.timestamp() % 60 != 0 {
            return Err(TimeRangeError::NotMinuteAligned);
        }
        if (to - from).num_seconds() > Self::MAX_SPAN_SECONDS {
            return Err(TimeRangeError::SpanTooLong);
        }
        Ok(Self { from, to })
    }

    /// The minutes in `[from, to)`, ascending, as unix-second minute
    /// indices (`floor(unix_seconds / 60)`).
    pub fn minutes(&self) -> impl Iterator<Item = i64> {
        let from_minute = self.from.timestamp().div_euclid(60);
        let to_minute = self.to.timestamp().div_euclid(60);
        from_minute..to_minute
    }
}

fn split_once(raw: &str) -> Result<(&str, &str), TimeRangeError> {
    raw.split_once('_')
        .filter(|(a, b)| !a.is_empty() && !b.is_empty())
        .ok_or_else(|| TimeRangeError::BadShape(raw.to_string()))
}

fn parse_naive(raw: &str, format: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    let naive = NaiveDateTime::parse_from_str(raw, format)
        .map_err(|err| TimeRangeError::BadTimestamp(raw.to_string(), err.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_range_parses_and_is_half_open() {
        let range = MillisTimeRange::parse("2021-01-01T00:00:00.000_2021-01-01T01:00:00.000").unwrap();
        assert!(range.contains(range.from));
        assert!(!range.contains(range.to));
    }

    #[test]
    fn minute_range_rejects_unaligned_boundaries() {
        let err = MinuteTimeRange::parse("2021-01-01T00:00:10_2021-01-01T00:01:10").unwrap_err();
        assert_eq!(err, TimeRangeError::NotMinuteAligned);
    }

    #[test]
    fn minute_range_rejects_long_span() {
        let err = MinuteTimeRange::parse("2021-01-01T00:00:00_2021-01-01T00:11:00").unwrap_err();
        assert_eq!(err, TimeRangeError::SpanTooLong);
    }

    #[test]
    fn minute_range_accepts_ten_minutes() {
        assert!(MinuteTimeRange::parse("2021-01-01T00:00:00_2021-01-01T00:10:00").is_ok());
    }

    #[test]
    fn minute_range_enumerates_minutes_ascending() {
        let range = MinuteTimeRange::parse("2021-01-01T00:00:00_2021-01-01T00:02:00").unwrap();
        let minutes: Vec<i64> = range.minutes().collect();
        assert_eq!(minutes.len(), 2);
        assert_eq!(minutes[1], minutes[0] + 1);
    }
}
