//! Feedback Record Types
//!
//! One type per pipeline stage; each stage produces a new value and never
//! mutates the previous one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::label::{Classification, Sentiment, Topic};

/// Department assigned when a record carries none
pub const UNSPECIFIED_DEPARTMENT: &str = "unspecified";

/// Feedback item as delivered by the corpus loader
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "feedback_text", alias = "comment", default)]
    pub text: String,
    #[serde(alias = "date", alias = "submitted_at", default)]
    pub timestamp: Option<String>,
    #[serde(alias = "dept", default)]
    pub department: Option<String>,
    /// Set by the loader for an input row it could not decode
    #[serde(skip)]
    pub malformed: bool,
}

impl RawRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
            department: None,
            malformed: false,
        }
    }

    /// Placeholder for an undecodable input row; the normalizer rejects it
    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Canonical record produced by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    /// Position in the loaded corpus
    pub index: usize,
    /// Lowercased, whitespace-collapsed text
    pub text: String,
    /// Calendar date, `None` when missing or unparseable
    pub date: Option<NaiveDate>,
    pub department: String,
}

impl NormalizedRecord {
    /// Raw form of this record, used to check normalization is idempotent
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            text: self.text.clone(),
            timestamp: self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            department: Some(self.department.clone()),
            malformed: false,
        }
    }
}

/// Normalized record with sentiment and topic labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    pub record: NormalizedRecord,
    pub sentiment: Classification<Sentiment>,
    pub topic: Classification<Topic>,
}

impl ClassifiedRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        self.record.date
    }

    pub fn department(&self) -> &str {
        &self.record.department
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_aliases() {
        let json = r#"{"feedback_text": "Road is bumpy", "date": "2025-01-02", "dept": "Roads"}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.text, "Road is bumpy");
        assert_eq!(record.timestamp.as_deref(), Some("2025-01-02"));
        assert_eq!(record.department.as_deref(), Some("Roads"));
    }

    #[test]
    fn test_raw_record_missing_fields() {
        let record: RawRecord = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(record, RawRecord::new("hello"));
    }
}
