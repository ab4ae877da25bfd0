//! Canonical RFC3339 text for event timestamps.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::EventError;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const ZONED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// An instant that either carries an explicit offset or is implicitly UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// No zone attached; treated as UTC and written with a `Z` suffix.
    Naive(NaiveDateTime),
    /// Explicit offset, written in `+HH:MM` notation.
    Zoned(DateTime<FixedOffset>),
}

impl Timestamp {
    /// RFC3339 with exactly six fractional digits.
    pub fn to_rfc3339(&self) -> String {
        match self {
            Timestamp::Naive(naive) => naive.format(NAIVE_FORMAT).to_string(),
            Timestamp::Zoned(zoned) => zoned.format(ZONED_FORMAT).to_string(),
        }
    }

    /// Parse RFC3339 text. A `Z` suffix or a missing zone yields
    /// [`Timestamp::Naive`]; an explicit offset yields [`Timestamp::Zoned`].
    /// The fractional part is optional.
    pub fn parse(text: &str) -> Result<Self, EventError> {
        let trimmed = text.trim();
        if let Some(naive) = trimmed
            .strip_suffix('Z')
            .or_else(|| trimmed.strip_suffix('z'))
        {
            return parse_naive(naive)
                .map(Timestamp::Naive)
                .map_err(|reason| invalid(text, reason));
        }

        match DateTime::parse_from_rfc3339(trimmed) {
            Ok(zoned) => Ok(Timestamp::Zoned(zoned)),
            Err(zoned_err) => parse_naive(trimmed)
                .map(Timestamp::Naive)
                .map_err(|_| invalid(text, zoned_err.to_string())),
        }
    }

    /// The instant in UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Naive(naive) => Utc.from_utc_datetime(naive),
            Timestamp::Zoned(zoned) => zoned.with_timezone(&Utc),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(zoned: DateTime<FixedOffset>) -> Self {
        Timestamp::Zoned(zoned)
    }
}

/// Naive UTC text for an instant, as used for `ts_rfc3339`.
pub fn format_utc_naive(instant: DateTime<Utc>) -> String {
    Timestamp::Naive(instant.naive_utc()).to_rfc3339()
}

fn parse_naive(text: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").map_err(|e| e.to_string())
}

fn invalid(text: &str, reason: impl Into<String>) -> EventError {
    EventError::InvalidTimestamp {
        text: text.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn naive(micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 3, micros)
            .unwrap()
    }

    fn is_naive_rfc3339(text: &str) -> bool {
        let bytes = text.as_bytes();
        bytes.len() == 27
            && text.ends_with('Z')
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes[10] == b'T'
            && bytes[13] == b':'
            && bytes[16] == b':'
            && bytes[19] == b'.'
            && text[20..26].bytes().all(|b| b.is_ascii_digit())
    }

    #[test]
    fn test_naive_always_six_fraction_digits() {
        assert_eq!(
            Timestamp::Naive(naive(0)).to_rfc3339(),
            "2024-03-09T07:05:03.000000Z"
        );
        assert_eq!(
            Timestamp::Naive(naive(42)).to_rfc3339(),
            "2024-03-09T07:05:03.000042Z"
        );
    }

    #[test]
    fn test_zoned_uses_offset_notation() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let zoned = offset.from_local_datetime(&naive(500_000)).unwrap();
        assert_eq!(
            Timestamp::Zoned(zoned).to_rfc3339(),
            "2024-03-09T07:05:03.500000+02:00"
        );
    }

    #[test]
    fn test_parse_z_suffix_is_naive() {
        let parsed = Timestamp::parse("2024-03-09T07:05:03.000042Z").unwrap();
        assert_eq!(parsed, Timestamp::Naive(naive(42)));
    }

    #[test]
    fn test_parse_lenient_forms() {
        assert_eq!(
            Timestamp::parse("2024-03-09T07:05:03").unwrap(),
            Timestamp::Naive(naive(0))
        );
        let zoned = Timestamp::parse("2024-03-09T09:05:03+02:00").unwrap();
        assert_eq!(zoned.to_utc(), Utc.from_utc_datetime(&naive(0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Timestamp::parse("yesterday"),
            Err(EventError::InvalidTimestamp { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_naive_roundtrip(secs in 0i64..4_102_444_800, micros in 0u32..1_000_000) {
            let instant = DateTime::from_timestamp(secs, micros * 1_000).unwrap();
            let text = format_utc_naive(instant);
            prop_assert!(is_naive_rfc3339(&text), "bad format: {}", text);
            let parsed = Timestamp::parse(&text).unwrap();
            prop_assert_eq!(parsed.to_utc(), instant);
            prop_assert_eq!(parsed.to_rfc3339(), text);
        }

        #[test]
        fn prop_zoned_roundtrip(
            secs in 0i64..4_102_444_800,
            micros in 0u32..1_000_000,
            offset_minutes in -720i32..=840,
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let zoned = DateTime::from_timestamp(secs, micros * 1_000)
                .unwrap()
                .with_timezone(&offset);
            let text = Timestamp::Zoned(zoned).to_rfc3339();
            let parsed = Timestamp::parse(&text).unwrap();
            prop_assert_eq!(parsed, Timestamp::Zoned(zoned));
        }
    }
}
