//! Date and datetime parsing for `date`/`datetime` fields
//!
//! Field formats use a small placeholder vocabulary (`yyyy`, `yy`, `mm`,
//! `dd`, `hh`, `ss`) that is rewritten into chrono `strftime` directives.
//! The rewrite is order-sensitive: `mm` means minutes after a colon and
//! months everywhere else, so the minute token is substituted before the
//! month token.
//!
//! Components a custom format leaves out default to 1900-01-01 00:00:00,
//! so `yyyy` or `mm/yyyy` describe whole dates.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::error::ValueError;
use crate::models::ParsedValue;

/// Default pattern for `date` fields
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Pattern displayed for `datetime` fields without a format. Such values are
/// read as RFC 3339, or with a trailing `UTC`/`GMT` zone name.
pub const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%Z";

/// Placeholder substitutions, applied case-insensitively in this order
const SUBSTITUTIONS: [(&str, &str); 7] = [
    ("hh", "%H"),
    (":mm", ":%M"),
    ("ss", "%S"),
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("mm", "%m"),
    ("dd", "%d"),
];

static SUBSTITUTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    SUBSTITUTIONS
        .iter()
        .map(|(token, directive)| {
            let pattern = format!("(?i){}", regex::escape(token));
            (
                Regex::new(&pattern).expect("substitution token is a valid regex"),
                *directive,
            )
        })
        .collect()
});

/// Rewrite a placeholder format such as `dd/mm/yyyy` into `%d/%m/%Y`
pub fn translate_format(format: &str) -> String {
    SUBSTITUTION_PATTERNS
        .iter()
        .fold(format.to_string(), |acc, (pattern, directive)| {
            pattern.replace_all(&acc, NoExpand(directive)).into_owned()
        })
}

/// Whether the parser produces a date or a datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date,
    DateTime,
}

/// A parser for one temporal field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    kind: Temporal,
    /// Translated `strftime` pattern; `None` selects the ISO 8601 defaults
    pattern: Option<String>,
    /// The format as declared on the field, for error messages
    declared: String,
}

impl DateParser {
    pub fn new(kind: Temporal, format: Option<&str>) -> Self {
        match format {
            Some(format) => Self {
                kind,
                pattern: Some(translate_format(format)),
                declared: format.to_string(),
            },
            None => Self {
                kind,
                pattern: None,
                declared: match kind {
                    Temporal::Date => ISO_DATE.to_string(),
                    Temporal::DateTime => ISO_DATETIME.to_string(),
                },
            },
        }
    }

    pub fn kind(&self) -> Temporal {
        self.kind
    }

    /// The `strftime` pattern in effect
    pub fn pattern(&self) -> &str {
        match (&self.pattern, self.kind) {
            (Some(pattern), _) => pattern,
            (None, Temporal::Date) => ISO_DATE,
            (None, Temporal::DateTime) => ISO_DATETIME,
        }
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedValue, ValueError> {
        match self.kind {
            Temporal::Date => self.parse_date(raw).map(ParsedValue::Date).ok_or_else(|| {
                ValueError::InvalidDate {
                    value: raw.to_string(),
                    format: self.declared.clone(),
                }
            }),
            Temporal::DateTime => self
                .parse_datetime(raw)
                .map(ParsedValue::DateTime)
                .ok_or_else(|| ValueError::InvalidDateTime {
                    value: raw.to_string(),
                    format: self.declared.clone(),
                }),
        }
    }

    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        match &self.pattern {
            Some(pattern) => parse_with_defaults(raw, pattern).map(|dt| dt.date()),
            None => NaiveDate::parse_from_str(raw, ISO_DATE).ok(),
        }
    }

    fn parse_datetime(&self, raw: &str) -> Option<NaiveDateTime> {
        match &self.pattern {
            Some(pattern) => parse_with_defaults(raw, pattern),
            None => parse_iso_datetime(raw),
        }
    }
}

/// Parse `raw` with a `strftime` pattern, filling unset components with
/// year 1900, January, day 1 and midnight
fn parse_with_defaults(raw: &str, pattern: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, raw, StrftimeItems::new(pattern)).ok()?;

    if parsed.year().is_none() && parsed.year_mod_100().is_none() && parsed.isoyear().is_none() {
        parsed.set_year(1900).ok()?;
    }
    if parsed.ordinal().is_none() {
        if parsed.month().is_none() {
            parsed.set_month(1).ok()?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1).ok()?;
        }
    }
    if parsed.hour_div_12().is_none() && parsed.hour_mod_12().is_none() {
        parsed.set_hour(0).ok()?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0).ok()?;
    }
    if parsed.second().is_none() {
        parsed.set_second(0).ok()?;
    }

    let date = parsed.to_naive_date().ok()?;
    let time = parsed.to_naive_time().ok()?;
    Some(date.and_time(time))
}

/// RFC 3339 with `Z` or an offset, or a trailing `UTC`/`GMT` zone name.
/// The result is normalised to UTC.
fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    let upper = raw.to_ascii_uppercase();
    let stripped = upper
        .strip_suffix("UTC")
        .or_else(|| upper.strip_suffix("GMT"))?;
    NaiveDateTime::parse_from_str(stripped.trim_end(), "%Y-%m-%dT%H:%M:%S").ok()
}
