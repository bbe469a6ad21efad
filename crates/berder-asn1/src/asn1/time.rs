//! UTCTime / GeneralizedTime conversion to and from UNIX timestamps.

use berder_types::Asn1Error;

fn bad_time(s: &str) -> Asn1Error {
    Asn1Error::malformed(format!("invalid time value {s:?}"))
}

/// Parse a fixed-width run of ASCII digits.
fn digits(s: &str, range: std::ops::Range<usize>) -> Result<u32, Asn1Error> {
    let part = s.get(range).ok_or_else(|| bad_time(s))?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_time(s));
    }
    part.parse().map_err(|_| bad_time(s))
}

/// Split off a trailing `Z` or `±HHMM` zone and return the offset in seconds.
/// A value with no zone suffix is taken as UTC.
fn split_zone(s: &str) -> Result<(&str, i64), Asn1Error> {
    if let Some(body) = s.strip_suffix('Z') {
        return Ok((body, 0));
    }
    if s.len() > 5 {
        let at = s.len() - 5;
        let (body, zone) = match (s.get(..at), s.get(at..)) {
            (Some(body), Some(zone)) => (body, zone),
            _ => return Err(bad_time(s)),
        };
        let sign = match zone.as_bytes()[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Ok((s, 0)),
        };
        let hh = digits(zone, 1..3)?;
        let mm = digits(zone, 3..5)?;
        if hh > 23 || mm > 59 {
            return Err(bad_time(s));
        }
        return Ok((body, sign * (hh as i64 * 3600 + mm as i64 * 60)));
    }
    Ok((s, 0))
}

/// Parse UTCTime `YYMMDDHHMMSS[Z|±HHMM]` to a UNIX timestamp.
/// RFC 5280: 00-49 → 2000-2049, 50-99 → 1950-1999.
pub fn parse_utc_time(s: &str) -> Result<i64, Asn1Error> {
    let (body, offset) = split_zone(s)?;
    if body.len() != 12 {
        return Err(bad_time(s));
    }
    let yy = digits(body, 0..2)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    let ts = datetime_to_unix(
        year,
        digits(body, 2..4)?,
        digits(body, 4..6)?,
        digits(body, 6..8)?,
        digits(body, 8..10)?,
        digits(body, 10..12)?,
    )
    .ok_or_else(|| bad_time(s))?;
    Ok(ts - offset)
}

/// Parse GeneralizedTime `YYYYMMDDHHMMSS[.fff][Z|±HHMM]` to a UNIX
/// timestamp. Fractional seconds are truncated.
pub fn parse_generalized_time(s: &str) -> Result<i64, Asn1Error> {
    let (body, offset) = split_zone(s)?;
    let body = match body.find(&['.', ','][..]) {
        Some(dot) => {
            let frac = &body[dot + 1..];
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_time(s));
            }
            &body[..dot]
        }
        None => body,
    };
    if body.len() != 14 {
        return Err(bad_time(s));
    }
    let ts = datetime_to_unix(
        digits(body, 0..4)?,
        digits(body, 4..6)?,
        digits(body, 6..8)?,
        digits(body, 8..10)?,
        digits(body, 10..12)?,
        digits(body, 12..14)?,
    )
    .ok_or_else(|| bad_time(s))?;
    Ok(ts - offset)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

/// Convert a date-time to a UNIX timestamp (seconds since 1970-01-01 00:00:00 UTC).
fn datetime_to_unix(year: u32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<i64> {
    if !(1..=12).contains(&month)
        || day == 0
        || day > days_in_month(year, month)
        || hour > 23
        || min > 59
        || sec > 59
    {
        return None;
    }
    // Days from year 0 to the start of the given year (Gregorian), March-based
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let m = (if month <= 2 { month + 9 } else { month - 3 }) as i64;
    let days = 365 * y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)
        + (m * 306 + 5) / 10
        + (day as i64 - 1)
        - 719468;
    Some(days * 86400 + hour as i64 * 3600 + min as i64 * 60 + sec as i64)
}

/// Convert a UNIX timestamp to date-time components.
fn unix_to_datetime(timestamp: i64) -> (i64, u32, u32, u32, u32, u32) {
    let days = timestamp.div_euclid(86400);
    let day_secs = timestamp.rem_euclid(86400) as u32;
    let hour = day_secs / 3600;
    let minute = (day_secs % 3600) / 60;
    let second = day_secs % 60;

    // Civil date from days since epoch (algorithm from Howard Hinnant)
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d, hour, minute, second)
}

/// Format a UNIX timestamp as GeneralizedTime `YYYYMMDDHHMMSSZ`.
pub fn format_generalized_time(timestamp: i64) -> String {
    let (year, month, day, hour, minute, second) = unix_to_datetime(timestamp);
    format!("{year:04}{month:02}{day:02}{hour:02}{minute:02}{second:02}Z")
}

/// Format a UNIX timestamp as UTCTime `YYMMDDHHMMSSZ`.
pub fn format_utc_time(timestamp: i64) -> String {
    let (year, month, day, hour, minute, second) = unix_to_datetime(timestamp);
    let yy = year.rem_euclid(100);
    format!("{yy:02}{month:02}{day:02}{hour:02}{minute:02}{second:02}Z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_to_unix_epoch() {
        assert_eq!(datetime_to_unix(1970, 1, 1, 0, 0, 0), Some(0));
        assert_eq!(datetime_to_unix(2000, 1, 1, 0, 0, 0), Some(946_684_800));
    }

    #[test]
    fn test_generalized_time_utc() {
        assert_eq!(parse_generalized_time("20000101000000Z").unwrap(), 946_684_800);
        assert_eq!(parse_generalized_time("20000101000000").unwrap(), 946_684_800);
    }

    #[test]
    fn test_generalized_time_fraction_and_offset() {
        assert_eq!(
            parse_generalized_time("20000101000000.123Z").unwrap(),
            946_684_800
        );
        // 01:30 at +0130 is midnight UTC
        assert_eq!(
            parse_generalized_time("20000101013000+0130").unwrap(),
            946_684_800
        );
        assert_eq!(
            parse_generalized_time("19991231230000-0100").unwrap(),
            946_684_800
        );
    }

    #[test]
    fn test_generalized_time_rejects_garbage() {
        assert!(parse_generalized_time("2000010100000Z").is_err());
        assert!(parse_generalized_time("2000+101000000Z").is_err());
        assert!(parse_generalized_time("20000230000000Z").is_err());
        assert!(parse_generalized_time("20000101000000.Z").is_err());
        assert!(parse_generalized_time("20000101000000+2500").is_err());
    }

    #[test]
    fn test_time_rejects_multibyte_text() {
        // 'é' straddles the zone split point.
        assert!(parse_generalized_time("aaaaaa\u{e9}aaaa").is_err());
        assert!(parse_generalized_time("2000010100\u{e9}00Z").is_err());
        assert!(parse_utc_time("00010100\u{e9}0Z").is_err());
    }

    #[test]
    fn test_time_rejects_short_and_truncated_zones() {
        assert!(parse_generalized_time("20000101000000+01").is_err());
        assert!(parse_generalized_time("20000101000000-1").is_err());
        assert!(parse_utc_time("000101000000+01").is_err());
        assert!(parse_generalized_time("+0100").is_err());
        assert!(parse_generalized_time("Z").is_err());
        assert!(parse_generalized_time("").is_err());
        assert!(parse_utc_time("-0100").is_err());
        assert!(parse_generalized_time("20000101000000+01x0").is_err());
    }

    #[test]
    fn test_utc_time_century_window() {
        let ts = parse_utc_time("491231235959Z").unwrap();
        assert_eq!(format_generalized_time(ts), "20491231235959Z");
        let ts = parse_utc_time("500101000000Z").unwrap();
        assert_eq!(format_generalized_time(ts), "19500101000000Z");
    }

    #[test]
    fn test_format_roundtrip() {
        // 2025-11-15 00:00:00 = 1763164800
        assert_eq!(format_generalized_time(1_763_164_800), "20251115000000Z");
        assert_eq!(format_utc_time(1_763_164_800), "251115000000Z");
        assert_eq!(format_generalized_time(-1), "19691231235959Z");
    }
}
