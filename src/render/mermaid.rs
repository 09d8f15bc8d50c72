//! Mermaid Chart Generation
//!
//! Converts declarative chart specs into Mermaid `xychart-beta` blocks.
//!
//! ## Supported Chart Kinds
//!
//! - bar: one `bar` series per data series
//! - line: one `line` series per data series
//! - stacked bar: cumulative `bar` series drawn tallest first, so each
//!   visible segment has the height of its own series

use crate::pipeline::{ChartKind, ChartSpec};
use crate::types::{PulseError, Result};

/// Check that every series has exactly one value per category
pub fn validate(chart: &ChartSpec) -> Result<()> {
    for series in &chart.series {
        if series.values.len() != chart.categories.len() {
            return Err(PulseError::render(format!(
                "chart '{}': series '{}' has {} values for {} categories",
                chart.title,
                series.name,
                series.values.len(),
                chart.categories.len()
            )));
        }
        if series.values.iter().any(|v| !v.is_finite()) {
            return Err(PulseError::render(format!(
                "chart '{}': series '{}' has a non-finite value",
                chart.title, series.name
            )));
        }
    }
    Ok(())
}

/// Mermaid source for `chart`, `None` when it has no categories
pub fn to_mermaid(chart: &ChartSpec) -> Result<Option<String>> {
    validate(chart)?;
    if chart.is_empty() {
        return Ok(None);
    }

    let series = match chart.kind {
        ChartKind::StackedBar => stacked(chart),
        _ => chart.series.iter().map(|s| s.values.clone()).collect(),
    };
    let keyword = match chart.kind {
        ChartKind::Line => "line",
        ChartKind::Bar | ChartKind::StackedBar => "bar",
    };
    let max = series
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let categories = chart
        .categories
        .iter()
        .map(|c| format!("\"{}\"", escape(c)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    out.push_str("```mermaid\n");
    out.push_str("xychart-beta\n");
    out.push_str(&format!("    title \"{}\"\n", escape(&chart.title)));
    out.push_str(&format!("    x-axis \"{}\" [{}]\n", escape(&chart.x_label), categories));
    out.push_str(&format!(
        "    y-axis \"{}\" 0 --> {}\n",
        escape(&chart.y_label),
        format_value(max.ceil())
    ));
    for values in &series {
        let values = values
            .iter()
            .map(|v| format_value(*v))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("    {} [{}]\n", keyword, values));
    }
    out.push_str("```\n");
    Ok(Some(out))
}

/// Running totals per category, largest total first
fn stacked(chart: &ChartSpec) -> Vec<Vec<f64>> {
    let mut totals = vec![0.0; chart.categories.len()];
    let mut layers = Vec::with_capacity(chart.series.len());
    for series in &chart.series {
        for (total, value) in totals.iter_mut().zip(&series.values) {
            *total += value;
        }
        layers.push(totals.clone());
    }
    layers.reverse();
    layers
}

/// Mermaid strings cannot contain double quotes
fn escape(text: &str) -> String {
    text.replace('"', "'").replace(['\n', '\r'], " ")
}

pub(crate) fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DataSeries;

    fn chart(kind: ChartKind, categories: &[&str], series: &[(&str, &[f64])]) -> ChartSpec {
        ChartSpec {
            kind,
            title: "Volume".to_string(),
            x_label: "Topic".to_string(),
            y_label: "Comments".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            series: series
                .iter()
                .map(|(name, values)| DataSeries {
                    name: name.to_string(),
                    values: values.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_bar_chart() {
        let c = chart(ChartKind::Bar, &["Billing", "Say \"hi\""], &[("Comments", &[3.0, 1.0])]);
        let out = to_mermaid(&c).unwrap().unwrap();
        assert!(out.starts_with("```mermaid\nxychart-beta\n"));
        assert!(out.contains("x-axis \"Topic\" [\"Billing\", \"Say 'hi'\"]"));
        assert!(out.contains("y-axis \"Comments\" 0 --> 3"));
        assert!(out.contains("    bar [3, 1]\n"));
        assert!(out.ends_with("```\n"));
    }

    #[test]
    fn test_stacked_bar_uses_cumulative_layers() {
        let c = chart(
            ChartKind::StackedBar,
            &["A", "B"],
            &[("Positive", &[1.0, 0.0]), ("Negative", &[2.0, 1.0]), ("Neutral", &[0.0, 3.0])],
        );
        let out = to_mermaid(&c).unwrap().unwrap();
        let bars: Vec<_> = out.lines().filter(|l| l.trim_start().starts_with("bar")).collect();
        assert_eq!(bars, vec!["    bar [3, 4]", "    bar [3, 1]", "    bar [1, 0]"]);
    }

    #[test]
    fn test_line_chart() {
        let c = chart(ChartKind::Line, &["2024-01", "2024-02"], &[("Comments", &[2.0, 1.0])]);
        let out = to_mermaid(&c).unwrap().unwrap();
        assert!(out.contains("    line [2, 1]\n"));
    }

    #[test]
    fn test_empty_chart_is_skipped() {
        let c = chart(ChartKind::Bar, &[], &[("Comments", &[])]);
        assert!(to_mermaid(&c).unwrap().is_none());
    }

    #[test]
    fn test_misaligned_series_rejected() {
        let c = chart(ChartKind::Bar, &["A", "B"], &[("Comments", &[1.0])]);
        let err = to_mermaid(&c).unwrap_err();
        assert!(matches!(err, PulseError::Render(_)));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(2.5), "2.50");
    }
}
