//! Report Renderers
//!
//! Turn an assembled `ReportDocument` into files. Each renderer produces its
//! full output in memory; the file is written under a temporary name and
//! renamed into place only after every output is staged, so a failed run never
//! leaves a partial report.

pub mod json;
pub mod markdown;
pub mod mermaid;

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ReportFormat;
use crate::pipeline::ReportDocument;
use crate::types::{PulseError, Result, ResultExt};

pub trait ReportRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// File name inside the output directory
    fn file_name(&self) -> &'static str;

    fn render(&self, doc: &ReportDocument) -> Result<String>;
}

/// Renderers selected by the configured format
pub fn renderers_for(format: ReportFormat) -> Vec<Box<dyn ReportRenderer>> {
    match format {
        ReportFormat::Markdown => vec![Box::new(MarkdownRenderer::new())],
        ReportFormat::Json => vec![Box::new(JsonRenderer)],
        ReportFormat::Both => vec![Box::new(MarkdownRenderer::new()), Box::new(JsonRenderer)],
    }
}

/// Render `doc` with every renderer, then write all outputs
///
/// Nothing is published unless every renderer succeeds and every temp file
/// is on disk. A failed rename removes the reports already moved into place.
pub fn write_reports(
    renderers: &[Box<dyn ReportRenderer>],
    doc: &ReportDocument,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let rendered = renderers
        .iter()
        .map(|r| r.render(doc).map(|content| (r.name(), r.file_name(), content)))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(output_dir)
        .render_context(format!("creating {}", output_dir.display()))?;

    let mut staged: Vec<(&'static str, PathBuf, PathBuf)> = Vec::with_capacity(rendered.len());
    for (name, file_name, content) in rendered {
        let path = output_dir.join(file_name);
        let tmp = temp_path(&path);
        if let Err(e) = fs::write(&tmp, content) {
            discard(staged.iter().map(|(_, tmp, _)| tmp).chain([&tmp]));
            return Err(PulseError::render(format!("writing {}: {}", tmp.display(), e)));
        }
        staged.push((name, tmp, path));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (i, (name, tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            discard(written.iter().chain(staged[i..].iter().map(|(_, tmp, _)| tmp)));
            return Err(PulseError::render(format!(
                "moving report to {}: {}",
                path.display(),
                e
            )));
        }
        info!("Wrote {} report to {}", name, path.display());
        written.push(path.clone());
    }
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Broken;

    impl ReportRenderer for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn file_name(&self) -> &'static str {
            "broken.txt"
        }

        fn render(&self, _doc: &ReportDocument) -> Result<String> {
            Err(PulseError::render("cannot draw"))
        }
    }

    fn doc() -> ReportDocument {
        ReportDocument {
            title: "Report".to_string(),
            sections: Vec::new(),
        }
    }

    #[test]
    fn test_writes_both_formats() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let written = write_reports(&renderers_for(ReportFormat::Both), &doc(), &out).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out.join("Executive_Summary.md").is_file());
        assert!(out.join("report_sections.json").is_file());
        assert!(!out.join("Executive_Summary.md.tmp").exists());
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let renderers: Vec<Box<dyn ReportRenderer>> = vec![Box::new(JsonRenderer), Box::new(Broken)];
        let err = write_reports(&renderers, &doc(), dir.path()).unwrap_err();
        assert_eq!(err.stage(), crate::types::Stage::Render);
        assert!(!dir.path().join("report_sections.json").exists());
    }

    #[test]
    fn test_failed_publish_removes_earlier_reports() {
        let dir = TempDir::new().unwrap();
        // A directory in the way makes the second rename fail
        fs::create_dir(dir.path().join("report_sections.json")).unwrap();

        let err = write_reports(&renderers_for(ReportFormat::Both), &doc(), dir.path()).unwrap_err();
        assert_eq!(err.stage(), crate::types::Stage::Render);
        assert!(!dir.path().join("Executive_Summary.md").exists());
        assert!(!dir.path().join("Executive_Summary.md.tmp").exists());
        assert!(!dir.path().join("report_sections.json.tmp").exists());
    }
}
