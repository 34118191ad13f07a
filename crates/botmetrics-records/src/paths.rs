//! Path resolution for the record store and configuration

use std::path::PathBuf;

/// Resolves standard paths for botmetrics data files
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// Resolve the per-user data directory
    pub fn new() -> std::io::Result<Self> {
        let data = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "data directory not found")
        })?;

        Ok(Self {
            home: data.join("botmetrics"),
        })
    }

    /// Use an explicit directory instead of the per-user default
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve from an optional override, falling back to the default location
    pub fn resolve(home: Option<&str>) -> std::io::Result<Self> {
        match home {
            Some(dir) => Ok(Self::with_home(dir)),
            None => Self::new(),
        }
    }

    /// Get records.jsonl path
    pub fn records_file(&self) -> PathBuf {
        self.home.join("records.jsonl")
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.json")
    }
}
