//! Corpus Loader
//!
//! Reads raw feedback records from CSV, JSON or YAML files. The input may be
//! a single path or a glob pattern; matched files are read in sorted path
//! order so record indices are stable between runs. Rows that cannot be
//! decoded are kept as malformed placeholders for the normalizer to reject.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::types::{PulseError, RawRecord, Result, ResultExt};

/// Supported corpus file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Csv,
    Json,
    Yaml,
}

impl CorpusFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

pub struct CorpusLoader;

impl CorpusLoader {
    /// Load every record matched by `input` (a path or glob pattern)
    pub fn load(input: &str) -> Result<Vec<RawRecord>> {
        let paths = Self::resolve(input)?;
        let mut records = Vec::new();
        for path in &paths {
            let loaded = Self::load_file(path)?;
            debug!("Loaded {} records from {}", loaded.len(), path.display());
            records.extend(loaded);
        }
        info!("Loaded {} records from {} file(s)", records.len(), paths.len());
        Ok(records)
    }

    /// Load one file, choosing the parser by extension
    pub fn load_file(path: &Path) -> Result<Vec<RawRecord>> {
        let format = CorpusFormat::from_path(path).ok_or_else(|| {
            PulseError::load(
                path.display().to_string(),
                "unsupported file type (expected .csv, .json, .yaml or .yml)",
            )
        })?;

        let file = File::open(path).load_context(path)?;
        let records = match format {
            CorpusFormat::Csv => read_csv(file).load_context(path)?,
            CorpusFormat::Json => {
                let rows: Vec<serde_json::Value> = serde_json::from_reader(file).load_context(path)?;
                decode_rows(rows, serde_json::from_value, path)
            }
            CorpusFormat::Yaml => {
                let rows: Vec<serde_yaml::Value> = serde_yaml::from_reader(file).load_context(path)?;
                decode_rows(rows, serde_yaml::from_value, path)
            }
        };
        Ok(records)
    }

    fn resolve(input: &str) -> Result<Vec<PathBuf>> {
        if !is_pattern(input) {
            let path = PathBuf::from(input);
            if !path.is_file() {
                return Err(PulseError::load(input, "data file not found"));
            }
            return Ok(vec![path]);
        }

        let entries = glob::glob(input).map_err(|e| PulseError::load(input, e.to_string()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PulseError::load(input, e.to_string()))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(PulseError::load(input, "pattern matched no files"));
        }
        Ok(paths)
    }
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// CSV with a header row; header names are matched case-insensitively
///
/// A row that fails to decode becomes a malformed placeholder; only I/O
/// failures abort the read.
fn read_csv(file: File) -> std::result::Result<Vec<RawRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(file);

    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    reader.set_headers(headers);

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!("Skipping malformed CSV row {}: {}", row + 1, e);
                records.push(RawRecord::malformed());
            }
        }
    }
    Ok(records)
}

/// Decode each element of a JSON or YAML array independently
fn decode_rows<V, E: std::fmt::Display>(
    rows: Vec<V>,
    decode: impl Fn(V) -> std::result::Result<RawRecord, E>,
    path: &Path,
) -> Vec<RawRecord> {
    rows.into_iter()
        .enumerate()
        .map(|(row, value)| {
            decode(value).unwrap_or_else(|e| {
                warn!("Skipping malformed row {} in {}: {}", row + 1, path.display(), e);
                RawRecord::malformed()
            })
        })
        .collect()
}
