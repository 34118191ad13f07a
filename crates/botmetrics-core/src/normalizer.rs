//! Canonicalization of parsed entries into [`LogRecord`]s

use crate::classifier::Classifier;
use crate::config::{Config, FieldDefaults};
use crate::error::{ParseError, RowError};
use crate::parser::{self, PipeEntry, RawEntry, TabularEntry, TabularRow};
use crate::timing::compute_response_time;
use botmetrics_records::LogRecord;

/// Turns raw entries of any input format into canonical records
#[derive(Debug, Clone)]
pub struct Normalizer {
    classifier: Classifier,
    defaults: FieldDefaults,
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: Classifier::new(&config.institution_marker),
            defaults: config.defaults.clone(),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Parse and normalize one pipe-log line
    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<LogRecord, ParseError> {
        parser::parse_pipe_line(line_no, line).map(|entry| self.normalize(RawEntry::Pipe(entry)))
    }

    /// Coerce and normalize one tabular row
    pub fn parse_row(&self, row_no: usize, row: &TabularRow) -> Result<LogRecord, RowError> {
        parser::parse_row(row_no, row).map(|entry| self.normalize(RawEntry::Tabular(entry)))
    }

    pub fn normalize(&self, entry: RawEntry) -> LogRecord {
        match entry {
            RawEntry::Pipe(entry) => self.normalize_pipe(entry),
            RawEntry::Tabular(entry) => self.normalize_tabular(entry),
        }
    }

    fn normalize_pipe(&self, entry: PipeEntry) -> LogRecord {
        let error_category = self.classifier.classify(
            entry.satisfaction,
            &entry.response,
            entry.error_tag.as_deref(),
        );

        LogRecord {
            timestamp: entry.timestamp,
            question_time: None,
            answer_time: None,
            query: entry.query.trim().to_string(),
            response: entry.response.trim().to_string(),
            satisfaction: entry.satisfaction,
            category: or_default(None, &self.defaults.category),
            subcategory: or_default(None, &self.defaults.subcategory),
            campus: or_default(None, &self.defaults.campus),
            education_level: or_default(None, &self.defaults.education_level),
            name: or_default(None, &self.defaults.name),
            error_category,
            response_time: None,
        }
    }

    fn normalize_tabular(&self, entry: TabularEntry) -> LogRecord {
        let error_category = self
            .classifier
            .classify(entry.satisfaction, &entry.response, None);
        let response_time =
            compute_response_time(Some(entry.question_time), Some(entry.answer_time));

        LogRecord {
            timestamp: entry.date.and_time(entry.question_time),
            question_time: Some(entry.question_time),
            answer_time: Some(entry.answer_time),
            query: entry.query.trim().to_string(),
            response: entry.response.trim().to_string(),
            satisfaction: entry.satisfaction,
            category: or_default(entry.category.as_deref(), &self.defaults.category),
            subcategory: or_default(entry.subcategory.as_deref(), &self.defaults.subcategory),
            campus: or_default(entry.campus.as_deref(), &self.defaults.campus),
            education_level: or_default(
                entry.education_level.as_deref(),
                &self.defaults.education_level,
            ),
            name: or_default(entry.name.as_deref(), &self.defaults.name),
            error_category,
            response_time,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&Config::new())
    }
}

/// Blank values count as missing
fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
