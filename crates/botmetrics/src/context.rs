//! Explicit view context handed to every command

use botmetrics_core::{Config, FilterSpec};
use botmetrics_records::{read_jsonl, LogRecord, Paths};

/// Where the data lives, how it was configured, and what is selected
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub paths: Paths,
    pub config: Config,
    pub filter: FilterSpec,
}

impl ViewContext {
    pub fn load(home: Option<&str>, filter: FilterSpec) -> anyhow::Result<Self> {
        let paths = Paths::resolve(home)?;
        let config = Config::load(&paths.config_file())?;
        Ok(Self {
            paths,
            config,
            filter,
        })
    }

    /// Every stored record, in ingestion order
    pub fn records(&self) -> anyhow::Result<Vec<LogRecord>> {
        Ok(read_jsonl(&self.paths.records_file())?)
    }

    /// Records passing the current filter
    pub fn select<'a>(&self, records: &'a [LogRecord]) -> Vec<&'a LogRecord> {
        self.filter.apply(records, &self.config.study_category)
    }

    /// The same context restricted to unsatisfied interactions
    pub fn errors_only(&self) -> Self {
        let mut ctx = self.clone();
        ctx.filter.satisfied = Some(false);
        ctx
    }
}
