//! JSON result file generation
//!
//! Writes the crawl snapshot as pretty-printed JSON with four-space
//! indentation. Non-ASCII text is written as UTF-8, not escaped.

use crate::model::CrawlResult;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sink writing the snapshot to a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn store(&self, result: &CrawlResult) -> OutputResult<()> {
        write_json_result(result, &self.path)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes the snapshot to `output_path`, replacing any existing file
pub fn write_json_result(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let json = format_json_result(result)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(json.as_bytes())?;
    writer.flush()?;

    tracing::info!("Data saved in {}", output_path.display());
    Ok(())
}

/// Formats the snapshot as indented JSON
pub fn format_json_result(result: &CrawlResult) -> OutputResult<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    result.serialize(&mut serializer)?;

    String::from_utf8(buffer).map_err(|e| OutputError::Write(e.to_string()))
}
