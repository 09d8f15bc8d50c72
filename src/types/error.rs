//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Every error knows which pipeline stage produced it and whether the run can
//! continue past it.
//!
//! ## Recovery Policy
//!
//! - **Record-level** (`InvalidRecord`, `Classifier`, `Timeout`): recovered with
//!   a safe default and tallied in the run diagnostics
//! - **Structural** (`Aggregation`, `Render`, `Load`, `Config`, ...): abort the
//!   run, no partial report is written

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Pipeline Stages
// =============================================================================

/// Pipeline stage that produced an error, used for the user-facing diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Config,
    Load,
    Normalize,
    Classify,
    Aggregate,
    Extract,
    Assemble,
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Load => write!(f, "load"),
            Self::Normalize => write!(f, "normalize"),
            Self::Classify => write!(f, "classify"),
            Self::Aggregate => write!(f, "aggregate"),
            Self::Extract => write!(f, "extract"),
            Self::Assemble => write!(f, "assemble"),
            Self::Render => write!(f, "render"),
        }
    }
}

// =============================================================================
// Record Rejection
// =============================================================================

/// Why a raw record was rejected by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Text missing or whitespace-only after trimming
    EmptyText,
    /// Input row that could not be decoded into a record
    Malformed,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "empty text"),
            Self::Malformed => write!(f, "malformed row"),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PulseError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // Setup Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to load corpus from {path}: {message}")]
    Load { path: String, message: String },

    // -------------------------------------------------------------------------
    // Record-Level Errors (recovered)
    // -------------------------------------------------------------------------
    #[error("Invalid record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: RejectReason },

    #[error("Classifier '{classifier}' failed: {message}")]
    Classifier { classifier: String, message: String },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Structural Errors (fatal)
    // -------------------------------------------------------------------------
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    #[error("Render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, PulseError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl PulseError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a classifier failure
    pub fn classifier(classifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Classifier {
            classifier: classifier.into(),
            message: message.into(),
        }
    }

    /// Create a corpus load error
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Stage that owns this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::Load { .. } | Self::Csv(_) | Self::Yaml(_) => Stage::Load,
            Self::InvalidRecord { .. } => Stage::Normalize,
            Self::Classifier { .. } | Self::Timeout { .. } => Stage::Classify,
            Self::Aggregation(_) => Stage::Aggregate,
            Self::Render(_) | Self::Io(_) | Self::Json(_) => Stage::Render,
        }
    }

    /// Check if the run can continue past this error with a safe default
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecord { .. } | Self::Classifier { .. } | Self::Timeout { .. }
        )
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Wrap any error as a render failure with context
    fn render_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Wrap any error as a load failure for the given path
    fn load_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn render_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| PulseError::Render(format!("{}: {}", context.into(), e)))
    }

    fn load_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| PulseError::load(path.display().to_string(), e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Aggregate.to_string(), "aggregate");
        assert_eq!(Stage::Render.to_string(), "render");
        assert_eq!(Stage::Classify.to_string(), "classify");
    }

    #[test]
    fn test_record_level_errors_are_recoverable() {
        let invalid = PulseError::InvalidRecord {
            index: 3,
            reason: RejectReason::EmptyText,
        };
        assert!(invalid.is_recoverable());
        assert_eq!(invalid.stage(), Stage::Normalize);

        let timeout = PulseError::timeout("sentiment", Duration::from_millis(5));
        assert!(timeout.is_recoverable());
        assert_eq!(timeout.stage(), Stage::Classify);

        assert!(PulseError::classifier("topic", "boom").is_recoverable());
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let agg = PulseError::Aggregation("bucket mismatch".to_string());
        assert!(!agg.is_recoverable());
        assert_eq!(agg.stage(), Stage::Aggregate);

        let render = PulseError::render("disk full");
        assert!(!render.is_recoverable());
        assert_eq!(render.stage(), Stage::Render);
    }

    #[test]
    fn test_error_display() {
        let err = PulseError::InvalidRecord {
            index: 7,
            reason: RejectReason::EmptyText,
        };
        assert_eq!(err.to_string(), "Invalid record #7: empty text");

        let err = PulseError::load("feedback.csv", "not found");
        assert_eq!(
            err.to_string(),
            "Failed to load corpus from feedback.csv: not found"
        );
    }

    #[test]
    fn test_render_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::other("denied"));
        let err = io.render_context("writing report").unwrap_err();
        assert!(matches!(err, PulseError::Render(ref m) if m == "writing report: denied"));
    }
}
