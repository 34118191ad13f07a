//! Engine configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fallback values substituted for missing categorical fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub category: String,
    pub subcategory: String,
    pub campus: String,
    pub education_level: String,
    pub name: String,
}

impl FieldDefaults {
    pub fn new() -> Self {
        Self {
            category: "Другое".to_string(),
            subcategory: "Не указано".to_string(),
            campus: "Не указан".to_string(),
            education_level: "Не указан".to_string(),
            name: "Не указано".to_string(),
        }
    }
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Ingestion and classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Response marker for questions outside the institution's scope (lowercase)
    pub institution_marker: String,

    /// Category whose subcategories can be filtered on
    pub study_category: String,

    /// Defaults for missing categorical fields
    pub defaults: FieldDefaults,

    /// Records per store write
    pub batch_size: usize,

    /// Log progress every N input lines
    pub progress_interval: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            institution_marker: "не относится к вшэ".to_string(),
            study_category: "Учеба".to_string(),
            defaults: FieldDefaults::new(),
            batch_size: 1000,
            progress_interval: 10_000,
        }
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        config.institution_marker = config.institution_marker.to_lowercase();
        if config.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
