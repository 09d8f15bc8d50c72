//! Report Assembler
//!
//! Lays out the report content as ordered sections: Overview, Visual
//! Analysis, Key Findings and Recommendations. Charts are declarative data;
//! drawing them is the renderer's job. Nothing here depends on wall-clock
//! time, so identical inputs assemble identical documents.

use serde::Serialize;

use super::aggregator::{AggregateStat, Aggregates, BucketKey};
use super::diagnostics::RunDiagnostics;
use super::insights::Insight;
use super::recommendations::{RecommendationRule, recommend};
use crate::types::{ClassifiedRecord, Sentiment, Topic};

// =============================================================================
// Document Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Overview,
    VisualAnalysis,
    KeyFindings,
    Recommendations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Chart description: one value per category in every series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<DataSeries>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub title: String,
    pub narrative: String,
    pub items: Vec<String>,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Everything the assembler reads
pub struct AssemblyInput<'a> {
    pub title: &'a str,
    pub diagnostics: &'a RunDiagnostics,
    pub records: &'a [ClassifiedRecord],
    pub aggregates: &'a Aggregates,
    pub insights: &'a [Insight],
    pub rules: &'a [RecommendationRule],
}

pub fn assemble(input: &AssemblyInput<'_>) -> ReportDocument {
    ReportDocument {
        title: input.title.to_string(),
        sections: vec![
            overview(input),
            visual_analysis(input.aggregates),
            key_findings(input),
            recommendations(input),
        ],
    }
}

fn overview(input: &AssemblyInput<'_>) -> ReportSection {
    let agg = input.aggregates;
    let diag = input.diagnostics;
    let total = &agg.total;

    let narrative = if total.count == 0 {
        "No feedback records were available for analysis. \
         The sections below are empty."
            .to_string()
    } else {
        let mut text = format!("This report analyzes {} resident comments", total.count);
        if let Some((first, last)) = date_range(input.records) {
            text.push_str(&format!(
                " received between {} and {}",
                first.format("%b %d, %Y"),
                last.format("%b %d, %Y")
            ));
        }
        text.push_str(&format!(
            ". The overall sentiment was {:.1}% positive, {:.1}% negative and {:.1}% neutral.",
            total.sentiment_pct.positive, total.sentiment_pct.negative, total.sentiment_pct.neutral
        ));
        if let Some((peak, count)) = agg.peak_period().filter(|(b, _)| *b != BucketKey::Unknown) {
            text.push_str(&format!(
                " Feedback volume peaked in {} with {} comments.",
                peak.long_label(agg.granularity),
                count
            ));
        }
        text
    };

    let mut items = vec![
        format!("Records loaded: {}", diag.raw_count),
        format!("Records analyzed: {}", total.count),
        format!("Records rejected: {}", diag.rejected_count()),
    ];

    let undated = agg.by_bucket.get(&BucketKey::Unknown).map_or(0, |s| s.count);
    if undated > 0 {
        items.push(format!("Records without a usable date: {}", undated));
    }
    if diag.classifier_errors() > 0 {
        items.push(format!(
            "Classifications defaulted after a timeout or error: {}",
            diag.classifier_errors()
        ));
    }
    if let Some((topic, count)) = most_discussed(agg) {
        items.push(format!(
            "Highest feedback volume: {} ({} comments)",
            topic.display_name(),
            count
        ));
    }
    if let Some((topic, count)) = most_negative(agg) {
        items.push(format!(
            "Primary area of concern: {} ({} negative comments)",
            topic.display_name(),
            count
        ));
    }

    ReportSection {
        kind: SectionKind::Overview,
        title: "Executive Summary".to_string(),
        narrative,
        items,
        charts: Vec::new(),
    }
}

fn visual_analysis(agg: &Aggregates) -> ReportSection {
    ReportSection {
        kind: SectionKind::VisualAnalysis,
        title: "Visual Analysis".to_string(),
        narrative: "The following charts provide a visual breakdown of the feedback data."
            .to_string(),
        items: Vec::new(),
        charts: vec![
            volume_by_topic(agg),
            sentiment_by_topic(agg),
            volume_over_time(agg),
            sentiment_by_department(agg),
        ],
    }
}

fn key_findings(input: &AssemblyInput<'_>) -> ReportSection {
    let granularity = input.aggregates.granularity;
    let narrative = match input.insights.first() {
        None => "No notable findings for this period.".to_string(),
        Some(first) => match (first.stat.bucket, first.stat.previous_bucket) {
            (Some(current), Some(previous)) => format!(
                "Most significant changes in {} compared with {}.",
                current.long_label(granularity),
                previous.long_label(granularity)
            ),
            (Some(current), None) => format!(
                "No earlier period is available; findings reflect levels in {}.",
                current.long_label(granularity)
            ),
            _ => "Findings reflect levels across all records.".to_string(),
        },
    };

    ReportSection {
        kind: SectionKind::KeyFindings,
        title: "Key Findings".to_string(),
        narrative,
        items: input.insights.iter().map(|i| i.summary.clone()).collect(),
        charts: Vec::new(),
    }
}

fn recommendations(input: &AssemblyInput<'_>) -> ReportSection {
    let recs = recommend(input.insights, input.rules);
    let narrative = if recs.is_empty() {
        "No recommendation rules were triggered for this period.".to_string()
    } else {
        "Based on the analysis, the following actions are recommended:".to_string()
    };

    ReportSection {
        kind: SectionKind::Recommendations,
        title: "Data-Driven Recommendations".to_string(),
        narrative,
        items: recs
            .iter()
            .map(|r| format!("{} ({}): {}", r.action, r.subject.label(), r.text))
            .collect(),
        charts: Vec::new(),
    }
}

// =============================================================================
// Charts
// =============================================================================

/// Topics with records, by count descending then topic order
fn ranked_topics(agg: &Aggregates) -> Vec<(Topic, &AggregateStat)> {
    let mut topics: Vec<_> = agg
        .by_topic
        .iter()
        .filter(|(_, s)| s.count > 0)
        .map(|(t, s)| (*t, s))
        .collect();
    topics.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
    topics
}

fn sentiment_series<'a>(stats: impl Iterator<Item = &'a AggregateStat> + Clone) -> Vec<DataSeries> {
    Sentiment::ALL
        .iter()
        .map(|s| DataSeries {
            name: capitalized(s.as_str()),
            values: stats.clone().map(|stat| stat.sentiment.get(*s) as f64).collect(),
        })
        .collect()
}

fn volume_by_topic(agg: &Aggregates) -> ChartSpec {
    let topics = ranked_topics(agg);
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Feedback Volume by Topic".to_string(),
        x_label: "Topic".to_string(),
        y_label: "Number of Comments".to_string(),
        categories: topics.iter().map(|(t, _)| t.display_name().to_string()).collect(),
        series: vec![DataSeries {
            name: "Comments".to_string(),
            values: topics.iter().map(|(_, s)| s.count as f64).collect(),
        }],
    }
}

fn sentiment_by_topic(agg: &Aggregates) -> ChartSpec {
    let topics = ranked_topics(agg);
    ChartSpec {
        kind: ChartKind::StackedBar,
        title: "Sentiment Breakdown by Topic".to_string(),
        x_label: "Topic".to_string(),
        y_label: "Number of Comments".to_string(),
        categories: topics.iter().map(|(t, _)| t.display_name().to_string()).collect(),
        series: sentiment_series(topics.iter().map(|(_, s)| *s)),
    }
}

fn volume_over_time(agg: &Aggregates) -> ChartSpec {
    let dated: Vec<_> = agg
        .by_bucket
        .iter()
        .filter(|(b, _)| **b != BucketKey::Unknown)
        .collect();
    ChartSpec {
        kind: ChartKind::Line,
        title: "Feedback Volume Over Time".to_string(),
        x_label: "Period".to_string(),
        y_label: "Number of Comments".to_string(),
        categories: dated.iter().map(|(b, _)| b.label(agg.granularity)).collect(),
        series: vec![DataSeries {
            name: "Comments".to_string(),
            values: dated.iter().map(|(_, s)| s.count as f64).collect(),
        }],
    }
}

fn sentiment_by_department(agg: &Aggregates) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::StackedBar,
        title: "Sentiment by Department".to_string(),
        x_label: "Department".to_string(),
        y_label: "Number of Comments".to_string(),
        categories: agg.by_department.keys().cloned().collect(),
        series: sentiment_series(agg.by_department.values()),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn date_range(records: &[ClassifiedRecord]) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    let mut dates = records.iter().filter_map(|r| r.date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn most_discussed(agg: &Aggregates) -> Option<(Topic, usize)> {
    ranked_topics(agg).first().map(|(t, s)| (*t, s.count))
}

fn most_negative(agg: &Aggregates) -> Option<(Topic, usize)> {
    agg.by_topic
        .iter()
        .map(|(t, s)| (*t, s.sentiment.negative))
        .filter(|(_, n)| *n > 0)
        .fold(None, |best: Option<(Topic, usize)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeBucket;
    use crate::pipeline::aggregator::aggregate;
    use crate::pipeline::aggregator::tests::record;
    use crate::pipeline::diagnostics::DiagnosticsCollector;
    use crate::pipeline::insights::InsightExtractor;
    use crate::pipeline::recommendations::default_rules;

    fn build(records: &[ClassifiedRecord]) -> ReportDocument {
        let agg = aggregate(records, TimeBucket::Month).unwrap();
        let insights = InsightExtractor::new(5, Default::default(), TimeBucket::Month)
            .from_aggregates(&agg);
        let mut collector = DiagnosticsCollector::new();
        collector.set_raw_count(records.len());
        let diagnostics = collector.finish(records);
        let rules = default_rules();
        assemble(&AssemblyInput {
            title: "Test Report",
            diagnostics: &diagnostics,
            records,
            aggregates: &agg,
            insights: &insights,
            rules: &rules,
        })
    }

    #[test]
    fn test_section_order() {
        let doc = build(&[record(0, Some("2024-01-02"), "A", Sentiment::Positive, Topic::Billing)]);
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Overview,
                SectionKind::VisualAnalysis,
                SectionKind::KeyFindings,
                SectionKind::Recommendations
            ]
        );
        assert_eq!(doc.section(SectionKind::VisualAnalysis).unwrap().charts.len(), 4);
    }

    #[test]
    fn test_empty_input_still_produces_sections() {
        let doc = build(&[]);
        assert_eq!(doc.sections.len(), 4);
        let overview = doc.section(SectionKind::Overview).unwrap();
        assert!(overview.narrative.starts_with("No feedback records"));
        let visual = doc.section(SectionKind::VisualAnalysis).unwrap();
        assert!(visual.charts.iter().all(ChartSpec::is_empty));
        assert!(doc.section(SectionKind::KeyFindings).unwrap().items.is_empty());
    }

    #[test]
    fn test_overview_mentions_range_and_peak() {
        let doc = build(&[
            record(0, Some("2024-01-05"), "Finance", Sentiment::Negative, Topic::Billing),
            record(1, Some("2024-01-20"), "Frontdesk", Sentiment::Negative, Topic::StaffConduct),
            record(2, Some("2024-02-03"), "Frontdesk", Sentiment::Positive, Topic::StaffConduct),
        ]);
        let overview = doc.section(SectionKind::Overview).unwrap();
        assert!(overview.narrative.contains("3 resident comments"));
        assert!(overview.narrative.contains("between Jan 05, 2024 and Feb 03, 2024"));
        assert!(overview.narrative.contains("peaked in January 2024 with 2 comments"));
        assert!(overview.items.iter().any(|i| i == "Highest feedback volume: Staff Conduct (2 comments)"));
        // Billing and Staff Conduct tie on negatives; the earlier topic wins
        assert!(overview.items.iter().any(|i| i.starts_with("Primary area of concern: Billing")));
    }

    #[test]
    fn test_chart_series_align_with_categories() {
        let doc = build(&[
            record(0, Some("2024-01-05"), "Finance", Sentiment::Negative, Topic::Billing),
            record(1, Some("2024-03-20"), "Parks", Sentiment::Neutral, Topic::ParksRecLibrary),
            record(2, None, "Parks", Sentiment::Positive, Topic::ParksRecLibrary),
        ]);
        let visual = doc.section(SectionKind::VisualAnalysis).unwrap();
        for chart in &visual.charts {
            for series in &chart.series {
                assert_eq!(series.values.len(), chart.categories.len());
            }
        }
        let timeline = &visual.charts[2];
        assert_eq!(timeline.categories, vec!["2024-01", "2024-03"]);
        let depts = &visual.charts[3];
        assert_eq!(depts.categories, vec!["Finance", "Parks"]);
        assert_eq!(depts.series[0].name, "Positive");
        assert_eq!(depts.series[0].values, vec![0.0, 1.0]);
    }
}
