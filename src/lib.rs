//! civicpulse - Resident Feedback Analysis
//!
//! Turns a batch of free-text resident feedback into an executive report:
//! sentiment and topic per comment, trends over time, ranked findings and
//! rule-based recommendations.
//!
//! ## Core Features
//!
//! - **Lexicon Sentiment**: word scores with negation and intensity modifiers
//! - **Keyword Topics**: closed topic set driven by a keyword rule table
//! - **Time Buckets**: weekly or monthly aggregation by department and topic
//! - **Ranked Insights**: period-over-period shifts, with a fallback to levels
//! - **Report Output**: Markdown with Mermaid charts, and a JSON dump
//!
//! ## Quick Start
//!
//! ```ignore
//! use civicpulse::{Config, CorpusLoader, FeedbackPipeline};
//!
//! let raw = CorpusLoader::load("sample_feedback.csv")?;
//! let output = FeedbackPipeline::new(Config::default()).run(raw).await?;
//! println!("{} insights", output.insights.len());
//! ```
//!
//! ## Modules
//!
//! - [`classifier`]: sentiment and topic classifiers, time-bounded execution
//! - [`pipeline`]: normalize, aggregate, extract and assemble stages
//! - [`corpus`]: CSV, JSON and YAML input
//! - [`render`]: Markdown and JSON report writers
//! - [`config`]: layered configuration

pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod pipeline;
pub mod render;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ReportFormat, TimeBucket};

// Error Types
pub use types::error::{PulseError, Result, ResultExt, Stage};

// Records and labels
pub use types::{ClassifiedRecord, NormalizedRecord, RawRecord, Sentiment, Topic};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    Aggregates, FeedbackPipeline, Insight, PipelineOutput, ReportDocument, RunDiagnostics,
};

pub use classifier::{Classifier, ClassifierSet, KeywordTopicClassifier, LexiconSentimentClassifier};
pub use corpus::CorpusLoader;
pub use render::{JsonRenderer, MarkdownRenderer, ReportRenderer};
