//! Run Diagnostics
//!
//! Tracks what happened to each record during a run: how many were loaded,
//! which were rejected and why, and how many classifications fell back to a
//! default label. Stage timings are collected alongside but kept out of the
//! serialized report so identical inputs produce identical sections.
//!
//! ## Usage
//!
//! ```ignore
//! let mut diag = DiagnosticsCollector::new();
//! diag.start_stage(Stage::Normalize);
//! diag.record_rejection(3, RejectReason::EmptyText);
//! let summary = diag.finish(&classified);
//! ```

use serde::Serialize;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::types::{ClassifiedRecord, Fallback, RejectReason, Stage};

// =============================================================================
// Summary Types
// =============================================================================

/// Input index and reason of one rejected record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

/// Fallback tallies for one classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FallbackCounts {
    pub low_confidence: usize,
    pub timeout: usize,
    pub failure: usize,
}

impl FallbackCounts {
    fn add(&mut self, fallback: Option<Fallback>) {
        match fallback {
            Some(Fallback::LowConfidence) => self.low_confidence += 1,
            Some(Fallback::Timeout) => self.timeout += 1,
            Some(Fallback::Failure) => self.failure += 1,
            None => {}
        }
    }

    /// Timeouts and failures; low confidence is a normal outcome
    pub fn errors(&self) -> usize {
        self.timeout + self.failure
    }

    pub fn total(&self) -> usize {
        self.low_confidence + self.timeout + self.failure
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: Stage,
    pub duration: Duration,
}

/// Per-run record accounting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub raw_count: usize,
    pub normalized_count: usize,
    pub rejected: Vec<Rejection>,
    pub sentiment_fallbacks: FallbackCounts,
    pub topic_fallbacks: FallbackCounts,
    #[serde(skip)]
    pub timings: Vec<StageTiming>,
    #[serde(skip)]
    pub run_id: String,
}

impl RunDiagnostics {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Classifier timeouts and failures across both classifiers
    pub fn classifier_errors(&self) -> usize {
        self.sentiment_fallbacks.errors() + self.topic_fallbacks.errors()
    }

    pub fn total_duration(&self) -> Duration {
        self.timings.iter().map(|t| t.duration).sum()
    }
}

// =============================================================================
// Collector
// =============================================================================

pub struct DiagnosticsCollector {
    run_id: String,
    raw_count: usize,
    rejected: Vec<Rejection>,
    timings: Vec<StageTiming>,
    current: Option<(Stage, Instant)>,
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            raw_count: 0,
            rejected: Vec::new(),
            timings: Vec::new(),
            current: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn set_raw_count(&mut self, count: usize) {
        self.raw_count = count;
    }

    pub fn record_rejection(&mut self, index: usize, reason: RejectReason) {
        self.rejected.push(Rejection { index, reason });
    }

    /// Close the running stage (if any) and start timing `stage`
    pub fn start_stage(&mut self, stage: Stage) {
        self.complete_stage();
        self.current = Some((stage, Instant::now()));
    }

    pub fn complete_stage(&mut self) {
        if let Some((stage, started)) = self.current.take() {
            let duration = started.elapsed();
            debug!("Stage {} finished in {:?}", stage, duration);
            self.timings.push(StageTiming { stage, duration });
        }
    }

    /// Final accounting, with fallbacks read from the classified records
    pub fn finish(mut self, classified: &[ClassifiedRecord]) -> RunDiagnostics {
        self.complete_stage();

        let mut sentiment_fallbacks = FallbackCounts::default();
        let mut topic_fallbacks = FallbackCounts::default();
        for record in classified {
            sentiment_fallbacks.add(record.sentiment.fallback);
            topic_fallbacks.add(record.topic.fallback);
        }

        RunDiagnostics {
            raw_count: self.raw_count,
            normalized_count: classified.len(),
            rejected: self.rejected,
            sentiment_fallbacks,
            topic_fallbacks,
            timings: self.timings,
            run_id: self.run_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::aggregator::tests::record;
    use crate::types::{Classification, Sentiment, Topic};

    #[test]
    fn test_fallbacks_counted_by_cause() {
        let mut a = record(0, None, "X", Sentiment::Neutral, Topic::Other);
        a.sentiment = Classification::fallback(Sentiment::Neutral, 0.0, Fallback::Timeout);
        a.topic = Classification::fallback(Topic::Other, 0.2, Fallback::LowConfidence);
        let mut b = record(1, None, "X", Sentiment::Neutral, Topic::Other);
        b.topic = Classification::fallback(Topic::Other, 0.0, Fallback::Failure);
        let c = record(2, None, "X", Sentiment::Positive, Topic::Billing);

        let mut collector = DiagnosticsCollector::new();
        collector.set_raw_count(4);
        collector.record_rejection(3, RejectReason::EmptyText);
        let diag = collector.finish(&[a, b, c]);

        assert_eq!(diag.raw_count, 4);
        assert_eq!(diag.normalized_count, 3);
        assert_eq!(diag.rejected_count(), 1);
        assert_eq!(diag.rejected[0].index, 3);
        assert_eq!(diag.sentiment_fallbacks.timeout, 1);
        assert_eq!(diag.topic_fallbacks.low_confidence, 1);
        assert_eq!(diag.topic_fallbacks.failure, 1);
        assert_eq!(diag.classifier_errors(), 2);
    }

    #[test]
    fn test_stage_timings_recorded_in_order() {
        let mut collector = DiagnosticsCollector::new();
        collector.start_stage(Stage::Normalize);
        collector.start_stage(Stage::Classify);
        let diag = collector.finish(&[]);
        let stages: Vec<_> = diag.timings.iter().map(|t| t.stage).collect();
        assert_eq!(stages, vec![Stage::Normalize, Stage::Classify]);
    }

    #[test]
    fn test_serialized_form_omits_timings() {
        let diag = DiagnosticsCollector::new().finish(&[]);
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("timings"));
        assert!(!json.contains("run_id"));
    }
}
