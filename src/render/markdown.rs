//! Markdown Report Renderer
//!
//! One page per section, separated by page breaks that survive conversion to
//! PDF or print. Charts are emitted as Mermaid blocks followed by the same
//! data as a table, so the numbers stay readable where Mermaid is not
//! rendered.

use chrono::NaiveDate;

use super::ReportRenderer;
use super::mermaid::{format_value, to_mermaid};
use crate::constants::report::MARKDOWN_FILE;
use crate::pipeline::{ChartSpec, ReportDocument, ReportSection};
use crate::types::Result;

const PAGE_BREAK: &str = "<div style=\"page-break-after: always;\"></div>";

pub struct MarkdownRenderer {
    generated: NaiveDate,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Renderer stamped with today's date
    pub fn new() -> Self {
        Self {
            generated: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_generated_date(mut self, date: NaiveDate) -> Self {
        self.generated = date;
        self
    }

    fn header(&self, doc: &ReportDocument, output: &mut String) {
        output.push_str(&format!("# {}\n\n", doc.title));
        output.push_str(&format!(
            "*Report Generated: {}*\n\n",
            self.generated.format("%B %d, %Y")
        ));
    }

    fn section(&self, number: usize, section: &ReportSection, output: &mut String) -> Result<()> {
        output.push_str(&format!("## {}. {}\n\n", number, section.title));
        if !section.narrative.is_empty() {
            output.push_str(&section.narrative);
            output.push_str("\n\n");
        }

        for (i, item) in section.items.iter().enumerate() {
            match section.kind {
                crate::pipeline::SectionKind::Recommendations => {
                    output.push_str(&format!("{}. {}\n", i + 1, item))
                }
                _ => output.push_str(&format!("- {}\n", item)),
            }
        }
        if !section.items.is_empty() {
            output.push('\n');
        }

        for chart in &section.charts {
            self.chart(chart, output)?;
        }
        Ok(())
    }

    fn chart(&self, chart: &ChartSpec, output: &mut String) -> Result<()> {
        output.push_str(&format!("### {}\n\n", chart.title));
        match to_mermaid(chart)? {
            None => {
                output.push_str("_No data available._\n\n");
                return Ok(());
            }
            Some(block) => {
                output.push_str(&block);
                output.push('\n');
            }
        }

        // Data table
        output.push_str(&format!("| {} |", cell(&chart.x_label)));
        for series in &chart.series {
            output.push_str(&format!(" {} |", cell(&series.name)));
        }
        output.push('\n');
        output.push_str("|---|");
        for _ in &chart.series {
            output.push_str("---:|");
        }
        output.push('\n');
        for (row, category) in chart.categories.iter().enumerate() {
            output.push_str(&format!("| {} |", cell(category)));
            for series in &chart.series {
                output.push_str(&format!(" {} |", format_value(series.values[row])));
            }
            output.push('\n');
        }
        output.push('\n');
        Ok(())
    }
}

impl ReportRenderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn file_name(&self) -> &'static str {
        MARKDOWN_FILE
    }

    fn render(&self, doc: &ReportDocument) -> Result<String> {
        let mut output = String::new();
        self.header(doc, &mut output);

        let pages = doc.sections.len();
        for (i, section) in doc.sections.iter().enumerate() {
            self.section(i + 1, section, &mut output)?;
            output.push_str(&format!("*Page {}*\n\n", i + 1));
            if i + 1 < pages {
                output.push_str(PAGE_BREAK);
                output.push_str("\n\n");
            }
        }

        output.push_str("---\n");
        output.push_str(&format!(
            "Generated by civicpulse v{}\n",
            env!("CARGO_PKG_VERSION")
        ));
        Ok(output)
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ChartKind, DataSeries, SectionKind};

    fn document() -> ReportDocument {
        ReportDocument {
            title: "Feedback | Q1".to_string(),
            sections: vec![
                ReportSection {
                    kind: SectionKind::Overview,
                    title: "Executive Summary".to_string(),
                    narrative: "Three comments.".to_string(),
                    items: vec!["Records analyzed: 3".to_string()],
                    charts: Vec::new(),
                },
                ReportSection {
                    kind: SectionKind::VisualAnalysis,
                    title: "Visual Analysis".to_string(),
                    narrative: String::new(),
                    items: Vec::new(),
                    charts: vec![
                        ChartSpec {
                            kind: ChartKind::Bar,
                            title: "Volume".to_string(),
                            x_label: "Topic".to_string(),
                            y_label: "Comments".to_string(),
                            categories: vec!["Billing".to_string(), "Parks | Rec".to_string()],
                            series: vec![DataSeries {
                                name: "Comments".to_string(),
                                values: vec![2.0, 1.0],
                            }],
                        },
                        ChartSpec {
                            kind: ChartKind::Line,
                            title: "Over Time".to_string(),
                            x_label: "Period".to_string(),
                            y_label: "Comments".to_string(),
                            categories: Vec::new(),
                            series: Vec::new(),
                        },
                    ],
                },
                ReportSection {
                    kind: SectionKind::Recommendations,
                    title: "Recommendations".to_string(),
                    narrative: "Do these.".to_string(),
                    items: vec!["First".to_string(), "Second".to_string()],
                    charts: Vec::new(),
                },
            ],
        }
    }

    fn render() -> String {
        MarkdownRenderer::new()
            .with_generated_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .render(&document())
            .unwrap()
    }

    #[test]
    fn test_header_and_pages() {
        let out = render();
        assert!(out.starts_with("# Feedback | Q1\n\n*Report Generated: July 01, 2025*\n\n"));
        assert!(out.contains("## 1. Executive Summary\n\nThree comments.\n\n- Records analyzed: 3\n"));
        assert_eq!(out.matches(PAGE_BREAK).count(), 2);
        assert!(out.contains("*Page 3*"));
    }

    #[test]
    fn test_chart_table_and_empty_chart() {
        let out = render();
        assert!(out.contains("```mermaid\nxychart-beta\n"));
        assert!(out.contains("| Topic | Comments |\n|---|---:|\n| Billing | 2 |\n| Parks \\| Rec | 1 |\n"));
        assert!(out.contains("### Over Time\n\n_No data available._"));
    }

    #[test]
    fn test_recommendations_are_numbered() {
        let out = render();
        assert!(out.contains("1. First\n2. Second\n"));
    }
}
