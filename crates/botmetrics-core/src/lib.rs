//! Log normalization and metrics aggregation for chat-bot interaction logs

mod aggregate;
mod analysis;
mod classifier;
mod config;
mod error;
mod filter;
mod ingest;
mod normalizer;
mod parser;
mod timing;

pub use aggregate::{
    aggregate, distribute_percentages, summarize, AggregateRow, Dimension, Summary,
    UnknownDimension,
};
pub use analysis::{
    error_heatmap, error_type_breakdown, hourly_highlights, recent, text_stats, ErrorTypeShare,
    HeatCell, HourStat, HourlyHighlights, TextStats,
};
pub use classifier::Classifier;
pub use config::{Config, FieldDefaults};
pub use error::{ConfigError, ParseError, ParseErrorKind, RowError};
pub use filter::{FilterSpec, ALL};
pub use ingest::{IngestReport, Ingestor, InputFormat};
pub use normalizer::Normalizer;
pub use parser::{
    is_skippable, missing_columns, parse_pipe_line, parse_row, PipeEntry, RawEntry, TabularEntry,
    TabularRow, TABULAR_COLUMNS,
};
pub use timing::compute_response_time;

/// Classify with the default rules and institution marker
pub fn classify(satisfied: bool, response: &str, tag: Option<&str>) -> botmetrics_records::ErrorCategory {
    Classifier::default().classify(satisfied, response, tag)
}
