//! Batch ingestion of pipe logs and CSV tables
//!
//! A bad line or row never aborts a batch: it is logged, counted and skipped.
//! Only I/O failures of the source or the sink are returned as errors.

use crate::config::Config;
use crate::normalizer::Normalizer;
use crate::parser::{self, TabularRow};
use botmetrics_records::LogRecord;
use serde::Serialize;
use std::io::{BufRead, Read};
use std::path::Path;

/// Failures kept verbatim in the report; the rest are only counted
const MAX_REPORTED_FAILURES: usize = 20;

/// Source format of an ingestion input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Pipe,
    Csv,
}

impl InputFormat {
    /// `.csv` files are tabular, anything else is a pipe log
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Pipe,
        }
    }
}

/// Outcome counts of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Blank and comment lines
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl IngestReport {
    fn record_failure(&mut self, message: String) {
        self.failed += 1;
        if self.failures.len() < MAX_REPORTED_FAILURES {
            self.failures.push(message);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records ingested, {} failed to parse, {} skipped",
            self.succeeded, self.failed, self.skipped
        )
    }
}

/// Drives a [`Normalizer`] over a whole input, flushing records in chunks
#[derive(Debug, Clone)]
pub struct Ingestor {
    normalizer: Normalizer,
    batch_size: usize,
    progress_interval: usize,
}

impl Ingestor {
    pub fn new(config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(config),
            batch_size: config.batch_size.max(1),
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Ingest a pipe log, handing records to `sink` in input order
    pub fn ingest_lines<R, F>(&self, reader: R, mut sink: F) -> std::io::Result<IngestReport>
    where
        R: BufRead,
        F: FnMut(&[LogRecord]) -> std::io::Result<()>,
    {
        let mut report = IngestReport::default();
        let mut batch = Vec::with_capacity(self.batch_size);

        for (index, line) in reader.split(b'\n').enumerate() {
            let line_no = index + 1;
            let bytes = line?;
            let line = String::from_utf8_lossy(&bytes);

            if parser::is_skippable(&line) {
                report.skipped += 1;
            } else {
                match self.normalizer.parse_line(line_no, &line) {
                    Ok(record) => {
                        report.succeeded += 1;
                        batch.push(record);
                    }
                    Err(err) => {
                        tracing::warn!(line = err.line, raw = %err.raw, "skipping line: {}", err.kind);
                        report.record_failure(err.to_string());
                    }
                }
            }

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut sink)?;
            }
            if line_no % self.progress_interval == 0 {
                tracing::info!(lines = line_no, "ingestion progress");
            }
        }

        self.flush(&mut batch, &mut sink)?;
        Ok(report)
    }

    /// Ingest a CSV table with a header row
    pub fn ingest_csv<R, F>(&self, reader: R, mut sink: F) -> std::io::Result<IngestReport>
    where
        R: Read,
        F: FnMut(&[LogRecord]) -> std::io::Result<()>,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(csv_to_io)?.clone();
        let missing = parser::missing_columns(headers.iter());

        let mut report = IngestReport::default();
        let mut batch = Vec::with_capacity(self.batch_size);

        for (index, result) in csv_reader.records().enumerate() {
            let row_no = index + 1;
            let outcome = match result {
                Err(err) if err.is_io_error() => return Err(csv_to_io(err)),
                Err(err) => Err(err.to_string()),
                Ok(_) if !missing.is_empty() => {
                    Err(format!("missing column(s): {}", missing.join(", ")))
                }
                Ok(raw) => raw
                    .deserialize::<TabularRow>(Some(&headers))
                    .map_err(|err| err.to_string())
                    .and_then(|row| {
                        self.normalizer
                            .parse_row(row_no, &row)
                            .map_err(|err| err.reason)
                    }),
            };

            match outcome {
                Ok(record) => {
                    report.succeeded += 1;
                    batch.push(record);
                }
                Err(reason) => {
                    tracing::warn!(row = row_no, "skipping row: {}", reason);
                    report.record_failure(format!("row {row_no}: {reason}"));
                }
            }

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut sink)?;
            }
            if row_no % self.progress_interval == 0 {
                tracing::info!(rows = row_no, "ingestion progress");
            }
        }

        self.flush(&mut batch, &mut sink)?;
        Ok(report)
    }

    /// Ingest into memory
    pub fn collect<R: BufRead>(
        &self,
        reader: R,
        format: InputFormat,
    ) -> std::io::Result<(Vec<LogRecord>, IngestReport)> {
        let mut records = Vec::new();
        let sink = |batch: &[LogRecord]| {
            records.extend_from_slice(batch);
            Ok(())
        };
        let report = match format {
            InputFormat::Pipe => self.ingest_lines(reader, sink)?,
            InputFormat::Csv => self.ingest_csv(reader, sink)?,
        };
        Ok((records, report))
    }

    fn flush<F>(&self, batch: &mut Vec<LogRecord>, sink: &mut F) -> std::io::Result<()>
    where
        F: FnMut(&[LogRecord]) -> std::io::Result<()>,
    {
        if batch.is_empty() {
            return Ok(());
        }
        tracing::debug!(records = batch.len(), "writing batch");
        sink(batch)?;
        batch.clear();
        Ok(())
    }
}

fn csv_to_io(err: csv::Error) -> std::io::Error {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{other:?}")),
    }
}
