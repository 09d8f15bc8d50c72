//! Record Normalizer
//!
//! Turns one raw record into its canonical form. Rejections are returned as
//! `PulseError::InvalidRecord` so the caller can tally them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{
    NormalizedRecord, PulseError, RawRecord, RejectReason, Result, UNSPECIFIED_DEPARTMENT,
};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Normalize one raw record
pub fn normalize(index: usize, raw: &RawRecord) -> Result<NormalizedRecord> {
    if raw.malformed {
        return Err(PulseError::InvalidRecord {
            index,
            reason: RejectReason::Malformed,
        });
    }

    let text = collapse_whitespace(&raw.text).to_lowercase();
    if text.is_empty() {
        return Err(PulseError::InvalidRecord {
            index,
            reason: RejectReason::EmptyText,
        });
    }

    let department = raw
        .department
        .as_deref()
        .map(collapse_whitespace)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNSPECIFIED_DEPARTMENT.to_string());

    Ok(NormalizedRecord {
        index,
        text,
        date: raw.timestamp.as_deref().and_then(parse_date),
        department,
    })
}

/// Parse a timestamp into a calendar date, `None` if no format matches
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
