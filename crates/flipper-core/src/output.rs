//! Batch report output in JSON or JSONL.
//!
//! JSON writes a single document with a summary and every outcome. JSONL
//! writes one outcome per line followed by a summary line, so a consumer can
//! stream results without buffering the whole batch.

use serde::Serialize;
use std::io::Write;

use crate::error::{FlipperError, Result};
use crate::types::{BatchReport, BatchSummary, ImageOutcome};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    summary: BatchSummary,
    outcomes: &'a [ImageOutcome],
}

#[derive(Serialize)]
struct SummaryLine {
    summary: BatchSummary,
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(json_error)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(json_error)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a whole batch report.
    pub fn write_report(&mut self, report: &BatchReport) -> Result<()> {
        let summary = report.summary();
        match self.format {
            OutputFormat::Json => self.write(&ReportDocument {
                summary,
                outcomes: &report.outcomes,
            }),
            OutputFormat::JsonLines => {
                for outcome in &report.outcomes {
                    self.write(outcome)?;
                }
                self.write(&SummaryLine { summary })
            }
        }
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// serde_json reports sink failures as its own error; keep them as I/O.
fn json_error(e: serde_json::Error) -> FlipperError {
    if e.is_io() {
        FlipperError::Io(e.into())
    } else {
        FlipperError::Json(e)
    }
}
