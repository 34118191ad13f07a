//! Error types for parsing, row coercion and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Why a pipe-log line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected at least 4 ` | `-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("invalid timestamp `{0}`")]
    Timestamp(String),

    #[error("segment `{0}` is not a `label: value` field")]
    Field(String),

    #[error("satisfaction must be 0 or 1, got `{0}`")]
    Satisfaction(String),
}

/// A malformed pipe-log line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub raw: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, raw: &str, kind: ParseErrorKind) -> Self {
        Self {
            line,
            raw: raw.to_string(),
            kind,
        }
    }
}

/// A tabular row missing a required column or failing type coercion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

/// Configuration file problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("batch_size must be at least 1")]
    ZeroBatchSize,
}
