//! JSON report formatter.
//!
//! The document is a deterministic function of the report; the only
//! variable field is the optional `generated_at` timestamp.

use super::{CategoryReport, Counts, Report, ReportFormatter};
use crate::reconcile::Mode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Formats reports as JSON.
#[derive(Debug, Default)]
pub struct JsonFormatter {
    generated_at: Option<DateTime<Utc>>,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the document with a generation time.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<DateTime<Utc>>,
    exit_code: i32,
    strict: bool,
    interrupted: bool,
    summary: JsonSummary,
    categories: &'a [CategoryReport],
    catalogue_errors: &'a [String],
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    #[serde(flatten)]
    counts: Counts,
}

impl ReportFormatter for JsonFormatter {
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        let output = JsonReport {
            mode: report.mode,
            generated_at: self.generated_at,
            exit_code: report.exit_code(),
            strict: report.strict,
            interrupted: report.interrupted(),
            summary: JsonSummary {
                total: report.counts.total(),
                counts: report.counts,
            },
            categories: &report.categories,
            catalogue_errors: &report.catalogue_errors,
        };

        serde_json::to_writer_pretty(&mut *writer, &output).map_err(std::io::Error::other)?;
        writeln!(writer)?;

        Ok(())
    }
}
