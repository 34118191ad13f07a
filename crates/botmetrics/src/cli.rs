use botmetrics_core::{Dimension, FilterSpec, InputFormat};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "botmetrics")]
#[command(version)]
#[command(about = "Chat-bot log normalization and metrics")]
pub struct Cli {
    /// Data directory holding records.jsonl and config.json
    #[arg(long, global = true)]
    pub home: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a pipe log or CSV table into the record store
    Ingest {
        /// Path to the log file or CSV table
        #[arg(short, long)]
        file: String,

        /// Input format (detected from the extension by default)
        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Clear the store before ingesting
        #[arg(long)]
        replace: bool,
    },

    /// Summary metrics grouped by a dimension
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// hour, date, week, month, category, subcategory, campus, education_level, error_category
        #[arg(long, default_value = "date")]
        by: Dimension,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Include hourly highlights, error heatmap and text statistics
        #[arg(long)]
        detailed: bool,
    },

    /// Breakdown of unsatisfied interactions
    Errors {
        #[command(flatten)]
        filters: FilterArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Most recent queries
    History {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of queries to show
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Write filtered records as CSV
    Export {
        /// Destination CSV path
        #[arg(short, long)]
        output: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Pipe,
    Csv,
}

impl FormatArg {
    pub fn resolve(self) -> Option<InputFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Pipe => Some(InputFormat::Pipe),
            FormatArg::Csv => Some(InputFormat::Csv),
        }
    }
}

/// Record selection shared by the read-side commands
#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Category, or "Все" for all
    #[arg(long)]
    pub category: Option<String>,

    /// Subcategory; only applies together with the study category
    #[arg(long)]
    pub subcategory: Option<String>,

    #[arg(long)]
    pub campus: Option<String>,

    #[arg(long)]
    pub education_level: Option<String>,
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        FilterSpec {
            date_from: args.from,
            date_to: args.to,
            category: args.category,
            subcategory: args.subcategory,
            campus: args.campus,
            education_level: args.education_level,
            satisfied: None,
        }
    }
}
