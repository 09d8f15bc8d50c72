//! Feedback Analysis Pipeline
//!
//! Turns a batch of raw feedback records into a report document.
//!
//! ## Stages
//!
//! 1. Normalize: clean each raw record, tally rejections
//! 2. Classify: sentiment and topic per record, time-bounded, concurrent
//! 3. Aggregate: counts by period, department and topic
//! 4. Extract: ranked insights for the latest period
//! 5. Assemble: ordered report sections with recommendations
//!
//! Data only flows forward. A fatal error in any stage aborts the run;
//! rejected records and classifier fallbacks are counted, not fatal.

pub mod aggregator;
pub mod assembler;
pub mod diagnostics;
pub mod insights;
pub mod normalizer;
pub mod recommendations;

pub use aggregator::{AggregateStat, Aggregates, BucketKey, PeriodSnapshot, aggregate};
pub use assembler::{
    AssemblyInput, ChartKind, ChartSpec, DataSeries, ReportDocument, ReportSection, SectionKind,
    assemble,
};
pub use diagnostics::{DiagnosticsCollector, FallbackCounts, Rejection, RunDiagnostics};
pub use insights::{Direction, Insight, InsightExtractor, InsightKind, Subject};
pub use normalizer::{normalize, parse_date};
pub use recommendations::{Recommendation, RecommendationRule, default_rules, recommend};

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::classifier::{ClassifierSet, classify_bounded};
use crate::config::Config;
use crate::types::{ClassifiedRecord, NormalizedRecord, PulseError, RawRecord, Result, Stage};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub document: ReportDocument,
    pub diagnostics: RunDiagnostics,
    pub records: Vec<ClassifiedRecord>,
    pub aggregates: Aggregates,
    pub insights: Vec<Insight>,
}

/// Pipeline orchestrator
///
/// Holds the run configuration and the classifiers; a single instance can
/// run any number of batches.
pub struct FeedbackPipeline {
    config: Config,
    classifiers: ClassifierSet,
}

impl FeedbackPipeline {
    /// Pipeline with the built-in classifiers
    pub fn new(config: Config) -> Self {
        let classifiers = ClassifierSet::standard(
            config.analysis.sentiment_threshold,
            config.analysis.topic_threshold,
        );
        Self {
            config,
            classifiers,
        }
    }

    pub fn with_classifiers(mut self, classifiers: ClassifierSet) -> Self {
        self.classifiers = classifiers;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, raw: Vec<RawRecord>) -> Result<PipelineOutput> {
        let mut diagnostics = DiagnosticsCollector::new();
        diagnostics.set_raw_count(raw.len());
        info!(
            "Starting analysis run {} over {} records",
            diagnostics.run_id(),
            raw.len()
        );

        // Stage 1: Normalize
        diagnostics.start_stage(Stage::Normalize);
        let normalized = self.normalize_all(&raw, &mut diagnostics)?;
        info!(
            "Stage 1: normalized {} records ({} rejected)",
            normalized.len(),
            raw.len() - normalized.len()
        );

        // Stage 2: Classify
        diagnostics.start_stage(Stage::Classify);
        let mut records = self.classify_all(normalized).await;
        aggregator::sort_chronologically(&mut records);
        info!("Stage 2: classified {} records", records.len());

        // Stage 3: Aggregate
        diagnostics.start_stage(Stage::Aggregate);
        let granularity = self.config.analysis.time_bucket;
        let aggregates = aggregate(&records, granularity)?;
        info!(
            "Stage 3: aggregated into {} {} buckets",
            aggregates.by_bucket.len(),
            granularity
        );

        // Stage 4: Extract
        diagnostics.start_stage(Stage::Extract);
        let insights = InsightExtractor::new(
            self.config.analysis.top_k_insights,
            self.config.ranking.clone(),
            granularity,
        )
        .from_aggregates(&aggregates);
        info!("Stage 4: extracted {} insights", insights.len());

        // Stage 5: Assemble
        diagnostics.start_stage(Stage::Assemble);
        let diagnostics = diagnostics.finish(&records);
        let document = assemble(&AssemblyInput {
            title: &self.config.report.title,
            diagnostics: &diagnostics,
            records: &records,
            aggregates: &aggregates,
            insights: &insights,
            rules: &self.config.recommendations.rules,
        });
        info!("Stage 5: assembled {} report sections", document.sections.len());

        if diagnostics.classifier_errors() > 0 {
            warn!(
                "{} classifications fell back after a timeout or error",
                diagnostics.classifier_errors()
            );
        }

        Ok(PipelineOutput {
            document,
            diagnostics,
            records,
            aggregates,
            insights,
        })
    }

    fn normalize_all(
        &self,
        raw: &[RawRecord],
        diagnostics: &mut DiagnosticsCollector,
    ) -> Result<Vec<NormalizedRecord>> {
        let mut normalized = Vec::with_capacity(raw.len());
        for (index, record) in raw.iter().enumerate() {
            match normalize(index, record) {
                Ok(record) => normalized.push(record),
                Err(PulseError::InvalidRecord { index, reason }) => {
                    warn!("Rejected record {}: {}", index, reason);
                    diagnostics.record_rejection(index, reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(normalized)
    }

    async fn classify_all(&self, normalized: Vec<NormalizedRecord>) -> Vec<ClassifiedRecord> {
        let timeout = self.config.analysis.classifier_timeout();
        let concurrency = self.config.analysis.classifier_concurrency.max(1);
        debug!(
            "Classifying with concurrency {} and {:?} budget per record",
            concurrency, timeout
        );

        futures::stream::iter(normalized)
            .map(|record| {
                let classifiers = self.classifiers.clone();
                async move {
                    let text: Arc<str> = Arc::from(record.text.as_str());
                    let (sentiment, topic) = tokio::join!(
                        classify_bounded(classifiers.sentiment, Arc::clone(&text), timeout),
                        classify_bounded(classifiers.topic, text, timeout),
                    );
                    ClassifiedRecord {
                        record,
                        sentiment,
                        topic,
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, KeywordTopicClassifier, LexiconSentimentClassifier};
    use crate::types::{Classification, Sentiment, Topic};
    use std::time::Duration;

    fn scenario() -> Vec<RawRecord> {
        vec![
            RawRecord::new("Billing was confusing")
                .with_timestamp("2024-01-05")
                .with_department("Finance"),
            RawRecord::new("Staff were rude")
                .with_timestamp("2024-01-10")
                .with_department("Frontdesk"),
            RawRecord::new("Great service")
                .with_timestamp("2024-02-01")
                .with_department("Frontdesk"),
        ]
    }

    #[tokio::test]
    async fn test_three_record_scenario() {
        let output = FeedbackPipeline::new(Config::default())
            .run(scenario())
            .await
            .unwrap();

        let agg = &output.aggregates;
        assert_eq!(agg.total.count, 3);
        let jan = BucketKey::Period(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let feb = BucketKey::Period(chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(agg.by_bucket.len(), 2);
        assert_eq!(agg.by_bucket[&jan].count, 2);
        assert_eq!(agg.by_bucket[&feb].count, 1);

        let jan_finance = &agg.by_bucket_department[&(jan, "Finance".to_string())];
        assert_eq!((jan_finance.count, jan_finance.sentiment.negative), (1, 1));
        let jan_frontdesk = &agg.by_bucket_department[&(jan, "Frontdesk".to_string())];
        assert_eq!((jan_frontdesk.count, jan_frontdesk.sentiment.negative), (1, 1));
        let feb_frontdesk = &agg.by_bucket_department[&(feb, "Frontdesk".to_string())];
        assert_eq!((feb_frontdesk.count, feb_frontdesk.sentiment.positive), (1, 1));

        assert!(!output.insights.is_empty());
        assert!(output.insights.iter().all(|i| i.stat.bucket == Some(feb)));
        assert_eq!(output.document.sections.len(), 4);
        assert_eq!(output.diagnostics.classifier_errors(), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let output = FeedbackPipeline::new(Config::default())
            .run(Vec::new())
            .await
            .unwrap();
        assert_eq!(output.aggregates.total.count, 0);
        assert!(output.aggregates.by_bucket.is_empty());
        assert!(output.insights.is_empty());
        assert_eq!(output.document.sections.len(), 4);
    }

    #[tokio::test]
    async fn test_rejections_are_tallied() {
        let mut raw = scenario();
        raw.insert(1, RawRecord::new("   "));
        let output = FeedbackPipeline::new(Config::default())
            .run(raw)
            .await
            .unwrap();
        assert_eq!(output.diagnostics.raw_count, 4);
        assert_eq!(output.diagnostics.normalized_count, 3);
        assert_eq!(output.diagnostics.rejected[0].index, 1);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_tallied() {
        let mut raw = scenario();
        raw.push(RawRecord::malformed());
        let output = FeedbackPipeline::new(Config::default())
            .run(raw)
            .await
            .unwrap();
        assert_eq!(output.diagnostics.rejected_count(), 1);
        assert_eq!(output.diagnostics.rejected[0].index, 3);
        assert_eq!(
            output.diagnostics.rejected[0].reason,
            crate::types::RejectReason::Malformed
        );
        assert_eq!(output.aggregates.total.count, 3);
    }

    struct SlowOnKeyword(LexiconSentimentClassifier);

    impl Classifier<Sentiment> for SlowOnKeyword {
        fn name(&self) -> &'static str {
            "slow-sentiment"
        }

        fn classify(&self, text: &str) -> Result<Classification<Sentiment>> {
            if text.contains("rude") {
                std::thread::sleep(Duration::from_millis(400));
            }
            self.0.classify(text)
        }
    }

    #[tokio::test]
    async fn test_classifier_timeout_falls_back() {
        let mut config = Config::default();
        config.analysis.classifier_timeout_ms = 50;
        let classifiers = ClassifierSet::new(
            Arc::new(SlowOnKeyword(LexiconSentimentClassifier::new(0.5))),
            Arc::new(KeywordTopicClassifier::new(0.5)),
        );
        let output = FeedbackPipeline::new(config)
            .with_classifiers(classifiers)
            .run(scenario())
            .await
            .unwrap();

        assert!(output.diagnostics.sentiment_fallbacks.timeout >= 1);
        let rude = output
            .records
            .iter()
            .find(|r| r.record.text.contains("rude"))
            .unwrap();
        assert_eq!(rude.sentiment.label, Sentiment::Neutral);
        assert_eq!(rude.sentiment.confidence, 0.0);
        assert_ne!(rude.topic.label, Topic::Other);
    }

    #[tokio::test]
    async fn test_identical_runs_serialize_identically() {
        let pipeline = FeedbackPipeline::new(Config::default());
        let first = pipeline.run(scenario()).await.unwrap();
        let second = pipeline.run(scenario()).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first.document).unwrap(),
            serde_json::to_string(&second.document).unwrap()
        );
    }

    #[tokio::test]
    async fn test_records_sorted_for_aggregation() {
        let mut raw = scenario();
        raw.reverse();
        raw.push(RawRecord::new("no date here"));
        let output = FeedbackPipeline::new(Config::default())
            .run(raw)
            .await
            .unwrap();
        let dates: Vec<_> = output.records.iter().map(|r| r.date()).collect();
        assert_eq!(dates.last(), Some(&None));
        assert!(dates[0] <= dates[1] && dates[1] <= dates[2]);
    }
}
