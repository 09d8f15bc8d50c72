//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Every field has a default so a run without any configuration file works.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{classify, ranking, report};
use crate::pipeline::recommendations::{RecommendationRule, default_rules};
use crate::types::{PulseError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Classification and bucketing settings
    pub analysis: AnalysisConfig,

    /// Insight ranking weights
    pub ranking: RankingConfig,

    /// Report output settings
    pub report: ReportConfig,

    /// Recommendation rule table
    pub recommendations: RecommendationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            analysis: AnalysisConfig::default(),
            ranking: RankingConfig::default(),
            report: ReportConfig::default(),
            recommendations: RecommendationConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PulseError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("analysis.sentiment_threshold", self.analysis.sentiment_threshold),
            ("analysis.topic_threshold", self.analysis.topic_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PulseError::Config(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if self.analysis.top_k_insights == 0 {
            return Err(PulseError::Config(
                "analysis.top_k_insights must be greater than 0".to_string(),
            ));
        }

        if self.analysis.classifier_timeout_ms == 0 {
            return Err(PulseError::Config(
                "analysis.classifier_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.analysis.classifier_concurrency == 0 {
            return Err(PulseError::Config(
                "analysis.classifier_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.ranking.magnitude_weight < 0.0 || self.ranking.volume_weight < 0.0 {
            return Err(PulseError::Config(
                "ranking weights must be non-negative".to_string(),
            ));
        }

        for rule in &self.recommendations.rules {
            if rule.id.trim().is_empty() {
                return Err(PulseError::Config(
                    "recommendation rules need a non-empty id".to_string(),
                ));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Time Bucket
// =============================================================================

/// Calendar period used to group records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    /// ISO week starting Monday
    Week,
    #[default]
    Month,
}

impl std::fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBucket::Week => write!(f, "week"),
            TimeBucket::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "weekly" => Ok(TimeBucket::Week),
            "month" | "monthly" => Ok(TimeBucket::Month),
            _ => Err(format!(
                "Unknown time bucket: {}. Valid values: week, month",
                s
            )),
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum sentiment confidence; below it the label resolves to neutral
    pub sentiment_threshold: f64,

    /// Minimum topic confidence; below it the label resolves to Other
    pub topic_threshold: f64,

    /// Grouping period for trends
    pub time_bucket: TimeBucket,

    /// Maximum number of insights in the report
    pub top_k_insights: usize,

    /// Per-record classifier time budget in milliseconds
    pub classifier_timeout_ms: u64,

    /// Records classified concurrently
    pub classifier_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sentiment_threshold: classify::DEFAULT_SENTIMENT_THRESHOLD,
            topic_threshold: classify::DEFAULT_TOPIC_THRESHOLD,
            time_bucket: TimeBucket::Month,
            top_k_insights: ranking::DEFAULT_TOP_K,
            classifier_timeout_ms: classify::DEFAULT_TIMEOUT_MS,
            classifier_concurrency: classify::DEFAULT_CONCURRENCY,
        }
    }
}

impl AnalysisConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }
}

// =============================================================================
// Ranking Configuration
// =============================================================================

/// Salience weights: `magnitude_weight * magnitude + volume_weight * volume_share`
///
/// With the default weights a high-volume subject can outrank a slightly
/// larger change. Set `volume_weight` near 0 (e.g. `0.001`) to rank by
/// magnitude first and use volume only to break ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub magnitude_weight: f64,
    pub volume_weight: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            magnitude_weight: ranking::DEFAULT_MAGNITUDE_WEIGHT,
            volume_weight: ranking::DEFAULT_VOLUME_WEIGHT,
        }
    }
}

// =============================================================================
// Report Configuration
// =============================================================================

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Both,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "both" => Ok(ReportFormat::Both),
            _ => Err(format!(
                "Unknown report format: {}. Valid values: markdown, json, both",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Document title
    pub title: String,

    /// Output directory
    pub output_dir: PathBuf,

    /// Output format
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: report::DEFAULT_TITLE.to_string(),
            output_dir: PathBuf::from(report::DEFAULT_OUTPUT_DIR),
            format: ReportFormat::Markdown,
        }
    }
}

// =============================================================================
// Recommendation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Ordered rule table; the first matching rule wins per insight
    pub rules: Vec<RecommendationRule>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
