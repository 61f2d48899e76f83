use chrono_tz::Tz;
use daysheet_core::constants::FALLBACK_TIMEZONE;
use daysheet_rfc::rfc::ical::expand::timezone::display_zone;

/// ## Summary
/// Resolves the configured display zone, falling back to
/// `America/Chicago` when the name is not a known zone.
#[must_use]
pub fn resolve_display_zone(name: &str) -> Tz {
    match display_zone(name) {
        Ok(tz) => tz,
        Err(err) => {
            tracing::warn!(%err, zone = name, fallback = FALLBACK_TIMEZONE, "Invalid display timezone, using fallback");
            Tz::America__Chicago
        }
    }
}
