//! Strict ISO-8601 date-time parsing.
//!
//! The lossy timestamp-recovery mode treats any plain string matching this
//! grammar as an instant, so the grammar is deliberately strict: a 4-digit
//! year, `T` separator, range-checked fields, optional fractional seconds,
//! optional `Z` or `±HH:MM` offset. Anything looser (space separators,
//! date-only strings, named zones) stays a plain string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

/// Parse `YYYY-MM-DDTHH:MM:SS[.fff…][Z|±HH:MM]` into a UTC instant.
///
/// Returns `None` unless the whole input matches the grammar. An absent
/// offset is read as UTC. Fractional digits beyond nanosecond precision
/// are accepted and truncated.
#[must_use]
pub fn parse(input: &str) -> Option<DateTime<Utc>> {
    let bytes = input.as_bytes();
    if bytes.len() < 19 {
        return None;
    }
    if bytes[4] != b'-'
        || bytes[7] != b'-'
        || bytes[10] != b'T'
        || bytes[13] != b':'
        || bytes[16] != b':'
    {
        return None;
    }

    let year = digits(&bytes[0..4])?;
    let month = digits(&bytes[5..7])?;
    let day = digits(&bytes[8..10])?;
    let hour = digits(&bytes[11..13])?;
    let minute = digits(&bytes[14..16])?;
    let second = digits(&bytes[17..19])?;

    // from_ymd_opt validates day-for-month, from_hms rejects hour 24
    // and minute/second 60.
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;

    let mut rest = &bytes[19..];
    let mut nanos: u32 = 0;
    if rest.first() == Some(&b'.') {
        let fraction = &rest[1..];
        let len = fraction.iter().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        let mut scaled: u32 = 0;
        let mut scale = 0;
        for &b in &fraction[..len.min(9)] {
            scaled = scaled * 10 + u32::from(b - b'0');
            scale += 1;
        }
        for _ in scale..9 {
            scaled *= 10;
        }
        nanos = scaled;
        rest = &rest[1 + len..];
    }

    let offset_minutes: i64 = match rest {
        [] | [b'Z'] => 0,
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            let hours = digits(&[*h1, *h2])?;
            let minutes = digits(&[*m1, *m2])?;
            if hours > 23 || minutes > 59 {
                return None;
            }
            let total = i64::from(hours * 60 + minutes);
            if *sign == b'-' { -total } else { total }
        }
        _ => return None,
    };

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    let naive = NaiveDateTime::new(date, time) - TimeDelta::minutes(offset_minutes);
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn digits(bytes: &[u8]) -> Option<u32> {
    let mut out: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        out = out * 10 + u32::from(b - b'0');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_utc() {
        let ts = parse("2024-03-01T12:30:45Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap());
    }

    #[test]
    fn test_parse_without_offset_is_utc() {
        assert_eq!(
            parse("2024-03-01T12:30:45"),
            parse("2024-03-01T12:30:45Z")
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let ts = parse("2024-03-01T12:30:45.123456789Z").unwrap();
        assert_eq!(ts.timestamp_subsec_nanos(), 123_456_789);
        // sub-nanosecond digits are truncated
        let truncated = parse("2024-03-01T12:30:45.1234567891Z").unwrap();
        assert_eq!(truncated, ts);
    }

    #[test]
    fn test_parse_numeric_offset() {
        let plus = parse("2024-03-01T12:30:45+02:00").unwrap();
        let utc = parse("2024-03-01T10:30:45Z").unwrap();
        assert_eq!(plus, utc);

        let minus = parse("2024-03-01T12:30:45-05:30").unwrap();
        assert_eq!(minus, parse("2024-03-01T18:00:45Z").unwrap());
    }

    #[test]
    fn test_reject_invalid_calendar_fields() {
        assert!(parse("2024-13-01T00:00:00Z").is_none());
        assert!(parse("2024-02-30T00:00:00Z").is_none());
        assert!(parse("2024-03-01T24:00:00Z").is_none());
        assert!(parse("2024-03-01T00:60:00Z").is_none());
        assert!(parse("2024-03-01T00:00:60Z").is_none());
    }

    #[test]
    fn test_reject_non_matching_shapes() {
        assert!(parse("2024-03-01").is_none());
        assert!(parse("2024-03-01 12:30:45").is_none());
        assert!(parse("2024-03-01T12:30:45.").is_none());
        assert!(parse("2024-03-01T12:30:45+0200").is_none());
        assert!(parse("2024-03-01T12:30:45Zjunk").is_none());
        assert!(parse("not a date").is_none());
    }

    #[test]
    fn test_leap_day() {
        assert!(parse("2024-02-29T00:00:00Z").is_some());
        assert!(parse("2023-02-29T00:00:00Z").is_none());
    }
}
