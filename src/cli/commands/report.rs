//! Report Command
//!
//! Loads the corpus, runs the analysis pipeline and writes the report.
//!
//! Usage:
//!   civicpulse [--input PATH] [--output DIR] [--config FILE] [--format F]
//!              [--time-bucket B] [--top-k N] [--dry-run]

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader, ReportFormat, TimeBucket};
use crate::corpus::CorpusLoader;
use crate::pipeline::{FeedbackPipeline, PipelineOutput};
use crate::render::{renderers_for, write_reports};
use crate::types::Result;

/// Command-line overrides; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub input: String,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub time_bucket: Option<TimeBucket>,
    pub top_k: Option<usize>,
    /// Analyze and print the summary without writing any file
    pub dry_run: bool,
    pub quiet: bool,
}

/// Layered configuration with command-line flags applied last
pub fn resolve_config(options: &ReportOptions) -> Result<Config> {
    let mut config = ConfigLoader::load(options.config.as_deref())?;

    if let Some(ref output) = options.output {
        config.report.output_dir = output.clone();
    }
    if let Some(format) = options.format {
        config.report.format = format;
    }
    if let Some(bucket) = options.time_bucket {
        config.analysis.time_bucket = bucket;
    }
    if let Some(top_k) = options.top_k {
        config.analysis.top_k_insights = top_k;
    }

    config.validate()?;
    Ok(config)
}

/// Run the full analysis; returns the written report paths
pub async fn run(options: ReportOptions) -> Result<Vec<PathBuf>> {
    let out = Output::quiet(options.quiet);
    let config = resolve_config(&options)?;

    out.header(&config.report.title);
    let raw = CorpusLoader::load(&options.input)?;
    out.success(&format!("Loaded {} records from {}", raw.len(), options.input));

    let pipeline = FeedbackPipeline::new(config.clone());
    let result = pipeline.run(raw).await?;
    print_summary(&out, &result);

    if options.dry_run {
        out.section("Effective Configuration");
        if !options.quiet {
            println!("{}", ConfigLoader::to_toml(&config)?);
        }
        out.info("Dry run: no files written");
        return Ok(Vec::new());
    }

    let written = write_reports(
        &renderers_for(config.report.format),
        &result.document,
        &config.report.output_dir,
    )?;
    for path in &written {
        out.success(&format!("Report written to {}", path.display()));
    }
    Ok(written)
}

fn print_summary(out: &Output, result: &PipelineOutput) {
    let diag = &result.diagnostics;

    out.section("Analysis Summary");
    out.field("Records loaded", diag.raw_count);
    out.field("Records analyzed", diag.normalized_count);
    out.field("Records rejected", diag.rejected_count());
    out.field("Periods", result.aggregates.by_bucket.len());
    out.field("Insights", result.insights.len());
    out.field("Duration", format!("{:.2?}", diag.total_duration()));

    for rejection in &diag.rejected {
        out.warning(&format!("Record {} rejected: {}", rejection.index, rejection.reason));
    }
    if diag.classifier_errors() > 0 {
        out.warning(&format!(
            "{} classifications used a default label after a timeout or error",
            diag.classifier_errors()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PulseError;
    use std::fs;
    use tempfile::TempDir;

    fn write_corpus(dir: &TempDir) -> String {
        let path = dir.path().join("feedback.csv");
        fs::write(
            &path,
            "feedback_text,timestamp,department\n\
             Billing was confusing,2024-01-05,Finance\n\
             Staff were rude,2024-01-10,Frontdesk\n\
             Great service,2024-02-01,Frontdesk\n",
        )
        .unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_run_writes_reports() {
        let dir = TempDir::new().unwrap();
        let options = ReportOptions {
            input: write_corpus(&dir),
            output: Some(dir.path().join("out")),
            format: Some(ReportFormat::Both),
            quiet: true,
            ..Default::default()
        };

        let written = run(options).await.unwrap();
        assert_eq!(written.len(), 2);
        let markdown = fs::read_to_string(dir.path().join("out/Executive_Summary.md")).unwrap();
        assert!(markdown.contains("## 1. Executive Summary"));
        assert!(markdown.contains("xychart-beta"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let options = ReportOptions {
            input: write_corpus(&dir),
            output: Some(dir.path().join("out")),
            dry_run: true,
            quiet: true,
            ..Default::default()
        };

        assert!(run(options).await.unwrap().is_empty());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_missing_input_fails_in_load_stage() {
        let options = ReportOptions {
            input: "/nonexistent/feedback.csv".to_string(),
            quiet: true,
            ..Default::default()
        };
        let err = run(options).await.unwrap_err();
        assert_eq!(err.stage(), crate::types::Stage::Load);
    }

    #[test]
    fn test_flags_override_config() {
        let options = ReportOptions {
            time_bucket: Some(TimeBucket::Week),
            top_k: Some(2),
            format: Some(ReportFormat::Json),
            ..Default::default()
        };
        let config = resolve_config(&options).unwrap();
        assert_eq!(config.analysis.time_bucket, TimeBucket::Week);
        assert_eq!(config.analysis.top_k_insights, 2);
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_invalid_flag_is_config_error() {
        let options = ReportOptions {
            top_k: Some(0),
            ..Default::default()
        };
        assert!(matches!(resolve_config(&options), Err(PulseError::Config(_))));
    }
}
