//! # Temporal Codec: UTC-Normalized Date-Times
//!
//! Parses and renders the `timestamp` field of an Action. Wire values are
//! ISO-8601 extended date-times (`2020-07-14T13:22:10.133`), optionally
//! followed by `Z` or a `±HH:MM[:SS]` offset. The in-memory value is always a
//! zone-less [`NaiveDateTime`] holding the UTC wall-clock instant.
//!
//! ## Modes
//!
//! - [`TemporalMode::Strict`] accepts only a zero offset (or none) and rejects
//!   every other offset as malformed input.
//! - [`TemporalMode::Relaxed`] accepts any offset and subtracts it, yielding
//!   the equivalent UTC wall-clock value.
//!
//! The `date-time` format extension used by the structural validator calls
//! [`is_valid`], which runs the exact same [`parse`] logic. A value rejected
//! by the validator is therefore also rejected at materialization, and the
//! other way round.
//!
//! Rendering always emits the local form without zone suffix. Fractional
//! seconds are written in groups of 3, 6 or 9 digits and omitted when zero.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::TemporalError;

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const LOCAL_FORMAT_NO_SECONDS: &str = "%Y-%m-%dT%H:%M";

/// Largest offset magnitude accepted, in seconds (18 hours).
const MAX_OFFSET_SECONDS: i64 = 18 * 3600;

/// Offset tolerance applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMode {
    /// Only a zero offset or no offset is accepted.
    Strict,
    /// Any offset is accepted and converted to UTC.
    Relaxed,
}

/// Parse ISO-8601 date-time text into a UTC wall-clock value.
///
/// # Errors
///
/// Returns [`TemporalError::Malformed`] when the text is not a date-time,
/// [`TemporalError::OffsetOutOfRange`] for offsets beyond ±18:00, and
/// [`TemporalError::NonUtcOffset`] for a non-zero offset in strict mode.
pub fn parse(text: &str, mode: TemporalMode) -> Result<NaiveDateTime, TemporalError> {
    let normalized = text.to_ascii_uppercase();
    let (local, offset) = split_offset(&normalized);
    let naive = parse_local(text, local)?;

    let Some(offset) = offset else {
        return Ok(naive);
    };

    let seconds = offset_seconds(text, offset)?;
    if seconds == 0 {
        return Ok(naive);
    }

    match mode {
        TemporalMode::Strict => Err(TemporalError::NonUtcOffset {
            input: text.to_string(),
            offset: offset.to_string(),
        }),
        TemporalMode::Relaxed => naive
            .checked_sub_signed(Duration::seconds(seconds))
            .ok_or_else(|| malformed(text, "instant out of range after offset conversion")),
    }
}

/// Returns true when `text` parses under `mode`.
pub fn is_valid(text: &str, mode: TemporalMode) -> bool {
    parse(text, mode).is_ok()
}

/// Render a UTC wall-clock value in canonical local form.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(LOCAL_FORMAT).to_string()
}

/// Split `text` into its local date-time part and the optional zone suffix.
///
/// The suffix starts at the first `Z`, `+` or `-` after the `T` separator;
/// the time part itself never contains those characters.
fn split_offset(text: &str) -> (&str, Option<&str>) {
    let Some(t) = text.find('T') else {
        return (text, None);
    };
    match text[t..].find(['Z', '+', '-']) {
        Some(pos) => {
            let at = t + pos;
            (&text[..at], Some(&text[at..]))
        }
        None => (text, None),
    }
}

fn parse_local(input: &str, local: &str) -> Result<NaiveDateTime, TemporalError> {
    let Some((date, time)) = local.split_once('T') else {
        return Err(malformed(input, "missing 'T' date/time separator"));
    };
    if !matches_shape(date, "dddd-dd-dd") {
        return Err(malformed(input, "date must be written as YYYY-MM-DD"));
    }
    check_time_shape(input, time)?;

    NaiveDateTime::parse_from_str(local, LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(local, LOCAL_FORMAT_NO_SECONDS))
        .map_err(|e| malformed(input, &e.to_string()))
}

/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.f` with 1 to 9 fraction digits.
fn check_time_shape(input: &str, time: &str) -> Result<(), TemporalError> {
    let (clock, fraction) = match time.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (time, None),
    };

    let shape_ok = match fraction {
        Some(digits) => {
            matches_shape(clock, "dd:dd:dd")
                && (1..=9).contains(&digits.len())
                && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => matches_shape(clock, "dd:dd") || matches_shape(clock, "dd:dd:dd"),
    };
    if shape_ok {
        Ok(())
    } else {
        Err(malformed(input, "time must be written as HH:MM[:SS[.fffffffff]]"))
    }
}

/// `d` in `pattern` stands for an ASCII digit; every other byte must match.
fn matches_shape(text: &str, pattern: &str) -> bool {
    text.len() == pattern.len()
        && text
            .bytes()
            .zip(pattern.bytes())
            .all(|(b, p)| if p == b'd' { b.is_ascii_digit() } else { b == p })
}

/// Convert `Z`, `±HH:MM` or `±HH:MM:SS` to signed seconds east of UTC.
fn offset_seconds(input: &str, offset: &str) -> Result<i64, TemporalError> {
    if offset == "Z" {
        return Ok(0);
    }

    let sign = match offset.as_bytes().first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(malformed(input, "offset must start with '+' or '-'")),
    };

    let parts: Vec<&str> = offset[1..].split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(malformed(input, "offset must be written as ±HH:MM or ±HH:MM:SS"));
    }

    let mut fields = [0i64; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(input, "offset components must be two digits"));
        }
        *slot = part.parse().map_err(|_| malformed(input, "offset is not numeric"))?;
    }

    let [hours, minutes, seconds] = fields;
    let total = hours * 3600 + minutes * 60 + seconds;
    if minutes > 59 || seconds > 59 || total > MAX_OFFSET_SECONDS {
        return Err(TemporalError::OffsetOutOfRange {
            input: input.to_string(),
            offset: offset.to_string(),
        });
    }

    Ok(sign * total)
}

fn malformed(input: &str, reason: &str) -> TemporalError {
    TemporalError::Malformed {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Serde adapter for `NaiveDateTime` fields holding UTC wall-clock values.
///
/// Serialization emits the canonical local form; deserialization parses in
/// relaxed mode so any offset on the wire is folded into UTC.
pub mod iso_local {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TemporalMode;

    /// Serialize as canonical local date-time text.
    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(value))
    }

    /// Deserialize from ISO-8601 text, converting any offset to UTC.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse(&text, TemporalMode::Relaxed).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, nanos: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_nano_opt(h, mi, s, nanos)
            .unwrap()
    }

    #[test]
    fn test_parse_zulu() {
        let ts = parse("2020-07-14T13:22:10Z", TemporalMode::Strict).unwrap();
        assert_eq!(ts, at(2020, 7, 14, 13, 22, 10, 0));
    }

    #[test]
    fn test_parse_fractional_without_offset() {
        let ts = parse("2020-07-14T13:22:10.133", TemporalMode::Strict).unwrap();
        assert_eq!(ts, at(2020, 7, 14, 13, 22, 10, 133_000_000));
    }

    #[test]
    fn test_parse_microseconds() {
        let ts = parse("2021-08-24T16:36:31.806149", TemporalMode::Strict).unwrap();
        assert_eq!(ts, at(2021, 8, 24, 16, 36, 31, 806_149_000));
    }

    #[test]
    fn test_parse_zero_offset_accepted_in_both_modes() {
        let expected = at(2011, 12, 3, 10, 15, 30, 0);
        assert_eq!(parse("2011-12-03T10:15:30+00:00", TemporalMode::Strict).unwrap(), expected);
        assert_eq!(parse("2011-12-03T10:15:30-00:00", TemporalMode::Strict).unwrap(), expected);
        assert_eq!(parse("2011-12-03T10:15:30+00:00", TemporalMode::Relaxed).unwrap(), expected);
    }

    #[test]
    fn test_parse_without_seconds() {
        let ts = parse("2020-07-14T13:22", TemporalMode::Strict).unwrap();
        assert_eq!(ts, at(2020, 7, 14, 13, 22, 0, 0));
    }

    #[test]
    fn test_relaxed_converts_offset_to_utc() {
        let ts = parse("2011-12-03T10:15:30+03:00", TemporalMode::Relaxed).unwrap();
        assert_eq!(ts, at(2011, 12, 3, 7, 15, 30, 0));
    }

    #[test]
    fn test_relaxed_converts_offset_with_seconds_across_midnight() {
        let ts = parse("2011-12-03T01:15:30+03:15:15", TemporalMode::Relaxed).unwrap();
        assert_eq!(ts, at(2011, 12, 2, 22, 0, 15, 0));
    }

    #[test]
    fn test_relaxed_negative_offset() {
        let ts = parse("2026-01-15T08:00:00-04:00", TemporalMode::Relaxed).unwrap();
        assert_eq!(ts, at(2026, 1, 15, 12, 0, 0, 0));
    }

    #[test]
    fn test_strict_rejects_non_zero_offset() {
        let err = parse("2011-12-03T10:15:30+01:00", TemporalMode::Strict).unwrap_err();
        assert!(matches!(err, TemporalError::NonUtcOffset { .. }), "got {err:?}");
    }

    #[test]
    fn test_rejects_region_ids() {
        for mode in [TemporalMode::Strict, TemporalMode::Relaxed] {
            assert!(!is_valid("2011-12-03T10:15:30+01:00[Europe/Paris]", mode));
            assert!(!is_valid("2011-12-03T10:15:30[Europe/Paris]", mode));
        }
    }

    #[test]
    fn test_rejects_non_date_times() {
        for text in [
            "2007-W44-6T16:18:05Z",
            "Tomorrow",
            "As soon as possible!!",
            "2020-07-14",
            "22:10:10",
            "",
        ] {
            assert!(!is_valid(text, TemporalMode::Relaxed), "accepted {text:?}");
        }
    }

    #[test]
    fn test_rejects_short_time_fields() {
        for text in ["2020-07-14T1:2:3", "2020-07-14T13:2:10", "2020-07-14T13:22:1", "2020-07-14T1:22"] {
            let err = parse(text, TemporalMode::Relaxed).unwrap_err();
            assert!(matches!(err, TemporalError::Malformed { .. }), "{text}: {err:?}");
        }
    }

    #[test]
    fn test_rejects_fraction_beyond_nanoseconds() {
        for text in [
            "2020-07-14T13:22:10.1234567891",
            "2020-07-14T13:22:10.123456789123",
            "2020-07-14T13:22:10.",
            "2020-07-14T13:22.5",
        ] {
            assert!(!is_valid(text, TemporalMode::Relaxed), "accepted {text:?}");
        }
        let ts = parse("2020-07-14T13:22:10.123456789", TemporalMode::Strict).unwrap();
        assert_eq!(ts, at(2020, 7, 14, 13, 22, 10, 123_456_789));
    }

    #[test]
    fn test_designators_are_case_insensitive() {
        let expected = at(2020, 7, 14, 13, 22, 10, 0);
        assert_eq!(parse("2020-07-14t13:22:10z", TemporalMode::Strict).unwrap(), expected);
        assert_eq!(parse("2020-07-14t16:22:10+03:00", TemporalMode::Relaxed).unwrap(), expected);
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        let err = parse("2011-12-03T10:15:30+19:00", TemporalMode::Relaxed).unwrap_err();
        assert!(matches!(err, TemporalError::OffsetOutOfRange { .. }), "got {err:?}");
    }

    #[test]
    fn test_format_omits_zero_fraction() {
        assert_eq!(format(&at(2020, 7, 14, 13, 22, 10, 0)), "2020-07-14T13:22:10");
        assert_eq!(format(&at(2020, 7, 14, 13, 22, 10, 133_000_000)), "2020-07-14T13:22:10.133");
    }

    #[test]
    fn test_serde_adapter_folds_offset() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            #[serde(with = "iso_local")]
            ts: NaiveDateTime,
        }

        let holder: Holder = serde_json::from_str(r#"{"ts":"2011-12-03T10:15:30+03:00"}"#).unwrap();
        assert_eq!(holder.ts, at(2011, 12, 3, 7, 15, 30, 0));
        assert_eq!(serde_json::to_string(&holder).unwrap(), r#"{"ts":"2011-12-03T07:15:30"}"#);
    }

    fn naive_strategy() -> impl Strategy<Value = NaiveDateTime> {
        (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000)
            .prop_map(|(y, mo, d, h, mi, s, micros)| at(y, mo, d, h, mi, s, micros * 1_000))
    }

    proptest! {
        /// Rendering then strict parsing is the identity.
        #[test]
        fn format_then_parse_is_identity(value in naive_strategy()) {
            let text = format(&value);
            prop_assert_eq!(parse(&text, TemporalMode::Strict).unwrap(), value);
        }

        /// Relaxed parsing subtracts exactly the written offset.
        #[test]
        fn relaxed_subtracts_offset(value in naive_strategy(), minutes in -(18 * 60i64)..=(18 * 60i64)) {
            let sign = if minutes < 0 { '-' } else { '+' };
            let abs = minutes.abs();
            let text = format!("{}{}{:02}:{:02}", format(&value), sign, abs / 60, abs % 60);
            let parsed = parse(&text, TemporalMode::Relaxed).unwrap();
            prop_assert_eq!(parsed, value - Duration::minutes(minutes));
        }
    }
}
