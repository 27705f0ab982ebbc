use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Publish timestamp of a feed entry, as the reader found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDate {
    /// Calendar fields already parsed by the reader; read as UTC.
    Structured(NaiveDateTime),
    /// Free text that needs a best-effort parse.
    Text(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoDate,
    Unparseable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoDate => write!(f, "no date found"),
            SkipReason::Unparseable(raw) => write!(f, "unparseable date {:?}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// `fallback` is set when the instant came from a raw string.
    Parsed { at: DateTime<Utc>, fallback: bool },
    Skip(SkipReason),
}

pub fn normalize(raw: &RawDate) -> Normalized {
    match raw {
        RawDate::Structured(naive) => Normalized::Parsed { at: as_utc(*naive), fallback: false },
        RawDate::Text(s) if s.trim().is_empty() => Normalized::Skip(SkipReason::NoDate),
        RawDate::Text(s) => match parse_date_str(s) {
            Some(at) => Normalized::Parsed { at, fallback: true },
            None => Normalized::Skip(SkipReason::Unparseable(s.clone())),
        },
        RawDate::Missing => Normalized::Skip(SkipReason::NoDate),
    }
}

// offset-carrying layouts seen in the wild besides RFC 3339 / RFC 2822
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
];

// no offset: assumed UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Best-effort parse of a free-text timestamp. Naive results are taken as UTC.
pub fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() { return None; }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) { return Some(dt.with_timezone(&Utc)); }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) { return Some(dt.with_timezone(&Utc)); }

    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) { return Some(dt.with_timezone(&Utc)); }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) { return Some(as_utc(ndt)); }
    }
    for fmt in DATE_FORMATS {
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(ndt) = nd.and_hms_opt(0, 0, 0) { return Some(as_utc(ndt)); }
        }
    }
    None
}

/// Oldest publish instant still inside the lookback window.
pub fn cutoff(now: DateTime<Utc>, horizon_hours: i64) -> DateTime<Utc> {
    now - Duration::hours(horizon_hours)
}

fn as_utc(ndt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc)
}
