//! Timezone resolution and UTC conversion for iCalendar date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::RfcResult;
use crate::rfc::ical::core::{DateTime as ICalDateTime, DateTimeForm};

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Local time that does not exist even after stepping over a DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),
}

/// Resolver for timezone identifiers, caching each TZID it has seen.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Windows zone names, vendor-prefixed TZIDs and IANA aliases are mapped
    /// to their canonical IANA zone first.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_owned()))?;

        self.cache.insert(tzid.to_owned(), tz);
        Ok(tz)
    }

    /// ## Summary
    /// Converts a parsed DATE-TIME into an absolute UTC instant.
    ///
    /// UTC values are taken as-is and floating values are read as UTC.
    /// Zoned values are resolved through their TZID.
    ///
    /// ## Errors
    ///
    /// Returns an error if the TZID is unknown or the local time cannot be placed.
    pub fn to_utc(&mut self, value: &ICalDateTime) -> Result<DateTime<Utc>, ConversionError> {
        match &value.form {
            DateTimeForm::Utc | DateTimeForm::Floating => Ok(value.local.and_utc()),
            DateTimeForm::Zoned { tzid } => convert_to_utc(value.local, tzid, self),
        }
    }
}

/// ## Summary
/// Resolves a configured display zone name (IANA, alias or Windows name).
///
/// ## Errors
///
/// Returns `RfcError::TimezoneError` if the name does not map to a known zone.
pub fn display_zone(name: &str) -> RfcResult<Tz> {
    Ok(TimeZoneResolver::new().resolve(name)?)
}

/// Normalizes common feed timezone identifiers to IANA names.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid)
        .trim();

    let iana_parser = IanaParserExtended::new();

    if let Some(tz) = WindowsParser::new().parse(stripped, None) {
        // Get the canonical IANA name from the BCP-47 timezone ID
        if let Some(entry) = iana_parser.iter().find(|entry| entry.time_zone == tz) {
            return entry.canonical.to_string();
        }
    }

    // Canonicalizes aliases like Europe/Kiev -> Europe/Kyiv
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_owned()
}

/// ## Summary
/// Converts a local datetime to UTC using the specified timezone.
///
/// Ambiguous local times (DST fold) take the earlier instant. Non-existent
/// local times (DST gap) are moved forward by one hour.
///
/// ## Errors
///
/// Returns an error if the timezone cannot be resolved or the shifted time
/// still does not exist.
pub fn convert_to_utc(
    local_time: NaiveDateTime,
    tzid: &str,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Utc>, ConversionError> {
    let tz = resolver.resolve(tzid)?;

    let resolved = match tz.from_local_datetime(&local_time) {
        LocalResult::None => tz
            .from_local_datetime(&(local_time + TimeDelta::hours(1)))
            .earliest(),
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earlier, _later) => Some(earlier),
    };

    resolved
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ConversionError::NonExistentTime(format!("{local_time} in timezone {tzid}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn resolve_standard_timezone_and_cache() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(resolver.resolve("America/New_York").unwrap(), Tz::America__New_York);
        assert!(resolver.cache.contains_key("America/New_York"));
        assert_eq!(resolver.resolve("America/New_York").unwrap(), Tz::America__New_York);
    }

    #[test]
    fn resolve_unknown_timezone() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(
            resolver.resolve("Mars/Olympus_Mons").unwrap_err(),
            ConversionError::UnknownTimezone("Mars/Olympus_Mons".to_owned())
        );
    }

    #[test]
    fn display_zone_accepts_aliases_and_rejects_garbage() {
        assert_eq!(display_zone("US/Central").unwrap(), Tz::America__Chicago);
        assert!(matches!(
            display_zone("Nowhere/Special"),
            Err(crate::error::RfcError::TimezoneError(
                ConversionError::UnknownTimezone(_)
            ))
        ));
    }

    #[test]
    fn normalize_windows_and_prefixed_names() {
        assert_eq!(normalize_tzid("Eastern Standard Time"), "America/New_York");
        assert_eq!(normalize_tzid("Central Standard Time"), "America/Chicago");
        assert_eq!(normalize_tzid("Pacific Standard Time"), "America/Los_Angeles");
        assert_eq!(
            normalize_tzid("/mozilla.org/America/New_York"),
            "America/New_York"
        );
        assert_eq!(normalize_tzid("US/Eastern"), "America/New_York");
    }

    #[test]
    fn convert_across_standard_and_daylight_time() {
        let mut resolver = TimeZoneResolver::new();

        let winter = convert_to_utc(local(2026, 1, 15, 10, 0), "America/New_York", &mut resolver).unwrap();
        assert_eq!(winter, Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap());

        let summer = convert_to_utc(local(2026, 7, 15, 10, 0), "America/New_York", &mut resolver).unwrap();
        assert_eq!(summer, Utc.with_ymd_and_hms(2026, 7, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn dst_gap_moves_forward_and_fold_takes_earlier() {
        let mut resolver = TimeZoneResolver::new();

        // 2026-03-08 02:30 does not exist in Chicago
        let gap = convert_to_utc(local(2026, 3, 8, 2, 30), "America/Chicago", &mut resolver).unwrap();
        assert_eq!(gap, Utc.with_ymd_and_hms(2026, 3, 8, 8, 30, 0).unwrap());

        // 2026-11-01 01:30 happens twice in Chicago; CDT (UTC-5) comes first
        let fold = convert_to_utc(local(2026, 11, 1, 1, 30), "America/Chicago", &mut resolver).unwrap();
        assert_eq!(fold, Utc.with_ymd_and_hms(2026, 11, 1, 6, 30, 0).unwrap());
    }

    #[test]
    fn to_utc_reads_floating_as_utc() {
        let mut resolver = TimeZoneResolver::new();
        let floating = ICalDateTime::floating(local(2026, 2, 1, 9, 0));
        assert_eq!(
            resolver.to_utc(&floating).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap()
        );

        let zoned = ICalDateTime::zoned(local(2026, 2, 1, 9, 0), "Europe/Berlin");
        assert_eq!(
            resolver.to_utc(&zoned).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
        );
    }
}
