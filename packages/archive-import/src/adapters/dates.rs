//! Best-effort parsing of last-updated dates scraped from source pages.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
];

/// Parse a scraped revision date into UTC.
///
/// Tries RFC timestamps first, then a list of date formats sites are known
/// to use. Ordinal suffixes ("June 3rd") are dropped before parsing.
/// Unparseable text yields `None`; a date in the future is clamped to now,
/// since a source site's clock skew must not produce works revised tomorrow.
pub fn convert_revised_at(text: &str) -> Option<DateTime<Utc>> {
    let ordinals = Regex::new(r"(\d+)(st|nd|rd|th)").unwrap();
    let cleaned = ordinals.replace_all(text.trim(), "$1").into_owned();

    let parsed = parse_any(&cleaned)?;
    let now = Utc::now();
    Some(if parsed > now { now } else { parsed })
}

fn parse_any(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}
