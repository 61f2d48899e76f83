//! Value type parsers for iCalendar (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{DateTime, DateTimeForm};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().ok();
    let year = s[0..4].parse::<i32>().ok();

    year.zip(field(4..6))
        .zip(field(6..8))
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDate, line, col))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z]. The `tzid` parameter, when present and the
/// value has no `Z` suffix, makes the value zoned.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDateTime, line, col);

    let (date_str, time_str) = s.split_once('T').ok_or_else(invalid)?;
    let date = parse_date(date_str, line, col)?;

    let (time_str, is_utc) = time_str
        .strip_suffix('Z')
        .map_or((time_str, false), |stripped| (stripped, true));

    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let field = |range: std::ops::Range<usize>| time_str[range].parse::<u32>().ok();
    // Leap second 60 is clamped to 59
    let time = field(0..2)
        .zip(field(2..4))
        .zip(field(4..6))
        .and_then(|((h, m), sec)| NaiveTime::from_hms_opt(h, m, sec.min(59)))
        .ok_or_else(invalid)?;

    let form = match (is_utc, tzid) {
        (true, _) => DateTimeForm::Utc,
        (false, Some(tz)) => DateTimeForm::Zoned {
            tzid: tz.to_owned(),
        },
        (false, None) => DateTimeForm::Floating,
    };

    Ok(DateTime {
        local: date.and_time(time),
        form,
    })
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<TimeDelta> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDuration, line, col);

    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let body = unsigned.strip_prefix('P').ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let mut total_secs: i64 = 0;
    let mut in_time = false;
    let mut digits = String::new();
    let mut saw_component = false;

    for c in body.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !digits.is_empty() {
                return Err(invalid());
            }
            in_time = true;
            continue;
        }

        let n: i64 = digits.parse().map_err(|_e| invalid())?;
        digits.clear();
        let unit = match (c, in_time) {
            ('W', false) => 7 * 86_400,
            ('D', false) => 86_400,
            ('H', true) => 3_600,
            ('M', true) => 60,
            ('S', true) => 1,
            _ => return Err(invalid()),
        };
        total_secs = n
            .checked_mul(unit)
            .and_then(|v| total_secs.checked_add(v))
            .ok_or_else(invalid)?;
        saw_component = true;
    }

    if !digits.is_empty() || !saw_component {
        return Err(invalid());
    }

    let secs = if negative { -total_secs } else { total_secs };
    TimeDelta::try_seconds(secs).ok_or_else(invalid)
}

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some('\\') | None => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
        }
    }

    result
}
