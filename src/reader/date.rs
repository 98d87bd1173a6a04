//! Date parsing with feed-integrity semantics.
//!
//! An absent date is `None` at the resolver level and never reaches these
//! functions. A *present* date that fails to parse is a hard
//! [`Error::FieldIntegrity`] whose message names the expected format family;
//! feeds that lie about their dates are broken feeds, not empty ones.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::{Error, Result};

/// Parses an RSS-family date (`pubDate`, `lastBuildDate`).
///
/// RFC 822/2822 is the dialect format; the RFC 3339 fallback mirrors how
/// lenient consumers have always treated RSS feeds that ship ISO dates.
pub(crate) fn parse_rfc2822_date(field: &'static str, raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|_| Error::unrecognised_date(field, "RFC 822 or 2822", raw))
}

/// Parses an Atom or Dublin Core date (`updated`, `published`, `dc:date`).
///
/// Accepts RFC 3339, ISO 8601 with a colon-less offset, fractional seconds,
/// and the bare `YYYY-MM-DD` form Dublin Core feeds commonly use (midnight
/// UTC).
pub(crate) fn parse_iso8601_date(field: &'static str, raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .or_else(|| date_only(raw))
        .ok_or_else(|| Error::unrecognised_date(field, "ISO 8601 or RFC 3339", raw))
}

fn date_only(raw: &str) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}
