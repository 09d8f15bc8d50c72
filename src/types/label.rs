//! Classification Labels
//!
//! Closed label sets produced by the classifiers. Every classified record
//! carries a definite label from these sets, never an empty one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback theme
///
/// Declaration order is the rule priority used to break keyword-score ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ParksRecLibrary,
    Sanitation,
    Transportation,
    CommunityDevelopment,
    WaterResources,
    PublicSafety,
    CodeEnforcement,
    Billing,
    StaffConduct,
    FacilityCleanliness,
    Other,
}

impl Topic {
    pub const ALL: [Topic; 11] = [
        Self::ParksRecLibrary,
        Self::Sanitation,
        Self::Transportation,
        Self::CommunityDevelopment,
        Self::WaterResources,
        Self::PublicSafety,
        Self::CodeEnforcement,
        Self::Billing,
        Self::StaffConduct,
        Self::FacilityCleanliness,
        Self::Other,
    ];

    /// Human-readable label used in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ParksRecLibrary => "Parks, Rec & Library",
            Self::Sanitation => "Public Works - Sanitation",
            Self::Transportation => "Public Works - Transportation",
            Self::CommunityDevelopment => "Community Development",
            Self::WaterResources => "Water Resources",
            Self::PublicSafety => "Public Safety",
            Self::CodeEnforcement => "Code Enforcement",
            Self::Billing => "Billing",
            Self::StaffConduct => "Staff Conduct",
            Self::FacilityCleanliness => "Facility Cleanliness",
            Self::Other => "General Inquiry",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Why a classification fell back to its default label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Confidence below the configured threshold
    LowConfidence,
    /// Classifier exceeded its per-record time budget
    Timeout,
    /// Classifier returned an error or panicked
    Failure,
}

/// A label with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification<L> {
    pub label: L,
    /// Certainty in [0, 1]
    pub confidence: f64,
    /// Set when `label` is the default rather than the classifier's pick
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl<L> Classification<L> {
    pub fn new(label: L, confidence: f64) -> Self {
        Self {
            label,
            confidence: clamp_unit(confidence),
            fallback: None,
        }
    }

    pub fn fallback(label: L, confidence: f64, reason: Fallback) -> Self {
        Self {
            label,
            confidence: clamp_unit(confidence),
            fallback: Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Classification::new(Sentiment::Positive, 1.7).confidence, 1.0);
        assert_eq!(Classification::new(Sentiment::Negative, -0.2).confidence, 0.0);
        assert_eq!(Classification::new(Topic::Other, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_topic_serde_names() {
        let json = serde_json::to_string(&Topic::StaffConduct).unwrap();
        assert_eq!(json, "\"staff_conduct\"");
        let json = serde_json::to_string(&Sentiment::Neutral).unwrap();
        assert_eq!(json, "\"neutral\"");
    }

    #[test]
    fn test_fallback_marker() {
        let c = Classification::fallback(Sentiment::Neutral, 0.2, Fallback::LowConfidence);
        assert!(c.is_fallback());
        assert!(!Classification::new(Topic::Billing, 1.0).is_fallback());
    }
}
