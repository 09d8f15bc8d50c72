//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Classification constants
pub mod classify {
    /// Default minimum sentiment confidence before falling back to neutral
    pub const DEFAULT_SENTIMENT_THRESHOLD: f64 = 0.5;

    /// Default minimum topic confidence before falling back to Other
    pub const DEFAULT_TOPIC_THRESHOLD: f64 = 0.5;

    /// Default per-record classifier time budget (milliseconds)
    pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

    /// Default number of records classified concurrently
    pub const DEFAULT_CONCURRENCY: usize = 4;

    /// Polarity band treated as neutral (|score| <= band)
    pub const NEUTRAL_BAND: f64 = 0.1;

    /// Absolute polarity at which strength saturates to 1.0
    pub const STRONG_POLARITY: f64 = 0.5;

    /// Tokens after a negation word whose score is inverted
    pub const NEGATION_WINDOW: usize = 3;

    /// Damping applied to a negated score
    pub const NEGATION_DAMPING: f64 = 0.8;
}

/// Insight ranking constants
pub mod ranking {
    /// Default number of insights kept
    pub const DEFAULT_TOP_K: usize = 5;

    /// Default weight of change magnitude in salience
    pub const DEFAULT_MAGNITUDE_WEIGHT: f64 = 1.0;

    /// Default weight of current-period volume share in salience
    pub const DEFAULT_VOLUME_WEIGHT: f64 = 0.25;

    /// Magnitudes below this are treated as no change
    pub const MIN_MAGNITUDE: f64 = 1e-9;
}

/// Report constants
pub mod report {
    /// Default report title
    pub const DEFAULT_TITLE: &str = "Resident Feedback Analysis";

    /// Default output directory
    pub const DEFAULT_OUTPUT_DIR: &str = "reports";

    /// Default corpus path
    pub const DEFAULT_INPUT: &str = "sample_feedback.csv";

    /// Markdown report file name
    pub const MARKDOWN_FILE: &str = "Executive_Summary.md";

    /// JSON sections file name
    pub const JSON_FILE: &str = "report_sections.json";
}
