// LogDeck - core/value.rs
//
// Lenient coercion of record cell values into timestamps, numbers and IPv4
// octets. Shared by the sort engine and the filter evaluator so both read
// a value the same way. Nothing here fails: unreadable input yields `None`
// or NaN and the caller decides where such values go.

use crate::core::model::FieldValue;
use crate::util::constants::EPOCH_MILLIS_THRESHOLD;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Zone-aware formats tried after RFC 3339 / RFC 2822.
const ZONED_FORMATS: &[&str] = &[
    "%d/%b/%Y:%H:%M:%S %z", // common/combined log format
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Zone-less formats, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S", // nginx error log
    "%Y-%m-%d %H:%M",
];

/// Parse a cell as a point in time.
///
/// Direct parse first (native timestamps, then textual formats), then a
/// numeric epoch fallback: seconds, or milliseconds when the magnitude is
/// too large to be seconds.
pub fn parse_timestamp(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(ts) => Some(*ts),
        FieldValue::Number(n) => from_epoch(*n),
        FieldValue::Text(s) => parse_timestamp_str(s),
        FieldValue::Bool(_) => None,
    }
}

/// Textual timestamp parse with the numeric fallback.
pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    s.parse::<f64>().ok().and_then(from_epoch)
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = if n.abs() > EPOCH_MILLIS_THRESHOLD {
        n
    } else {
        n * 1000.0
    };
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// Numeric coercion. Empty or non-numeric text is NaN.
pub fn coerce_number(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Number(n) => *n,
        FieldValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        FieldValue::Timestamp(ts) => ts.timestamp_millis() as f64,
        FieldValue::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                f64::NAN
            } else {
                t.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
    }
}

/// Integer coercion for status-code style fields.
pub fn coerce_integer(value: &FieldValue) -> Option<i64> {
    let n = coerce_number(value);
    if n.is_finite() && n.fract() == 0.0 {
        Some(n as i64)
    } else {
        None
    }
}

/// Split a dotted-quad address into four numeric octets.
///
/// Anything that does not decompose into exactly four all-digit parts
/// (IPv6, host names, `1.2.3`) yields `None`.
pub fn ipv4_octets(raw: &str) -> Option<[u32; 4]> {
    let mut octets = [0u32; 4];
    let mut parts = raw.trim().split('.');
    for slot in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_rfc3339_and_clf() {
        let a = parse_timestamp_str("2024-03-01T10:00:00Z").unwrap();
        let b = parse_timestamp_str("01/Mar/2024:10:00:00 +0000").unwrap();
        assert_eq!(a, b);
        let c = parse_timestamp_str("2024-03-01 10:00:00").unwrap();
        assert_eq!(a, c);
        let d = parse_timestamp_str("2024/03/01 10:00:00").unwrap();
        assert_eq!(a, d);
    }

    #[test]
    fn test_numeric_epoch_fallback() {
        let secs = parse_timestamp_str("1709287200").unwrap();
        let millis = parse_timestamp_str("1709287200000").unwrap();
        assert_eq!(secs, millis);
        assert_eq!(secs.year(), 2024);
        let from_number = parse_timestamp(&FieldValue::Number(1_709_287_200.0)).unwrap();
        assert_eq!(from_number, secs);
    }

    #[test]
    fn test_unparsable_timestamp() {
        assert!(parse_timestamp_str("yesterday-ish").is_none());
        assert!(parse_timestamp_str("   ").is_none());
        assert!(parse_timestamp(&FieldValue::Bool(true)).is_none());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&FieldValue::from(" 42 ")), 42.0);
        assert!(coerce_number(&FieldValue::from("")).is_nan());
        assert!(coerce_number(&FieldValue::from("n/a")).is_nan());
        assert_eq!(coerce_number(&FieldValue::from(true)), 1.0);
        assert_eq!(coerce_integer(&FieldValue::from("404")), Some(404));
        assert_eq!(coerce_integer(&FieldValue::from("4.5")), None);
    }

    #[test]
    fn test_ipv4_octets() {
        assert_eq!(ipv4_octets("10.0.0.2"), Some([10, 0, 0, 2]));
        assert_eq!(ipv4_octets("10.0.0"), None);
        assert_eq!(ipv4_octets("10.0.0.1.5"), None);
        assert_eq!(ipv4_octets("::1"), None);
        assert_eq!(ipv4_octets("10.0.x.1"), None);
        assert_eq!(ipv4_octets("10..0.1"), None);
    }
}
