use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::report::ReportOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Dashboard settings, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file opened on start-up.
    pub data_path: Option<PathBuf>,
    /// Year `car_age` is measured against.
    pub reference_year: i32,
    /// Car age window selected on load, clamped to the observed ages.
    pub default_age_window: [i32; 2],
    pub histogram_bins: usize,
    pub top_models: usize,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            reference_year: 2025,
            default_age_window: [0, 30],
            histogram_bins: 50,
            top_models: 10,
            preview_rows: 10,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn age_window(&self) -> (i32, i32) {
        let [lo, hi] = self.default_age_window;
        (lo, hi)
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            histogram_bins: self.histogram_bins,
            top_models: self.top_models,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("explorer.json");
        fs::write(&path, r#"{ "reference_year": 2030, "data_path": "cars.zip" }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.reference_year, 2030);
        assert_eq!(config.data_path, Some(PathBuf::from("cars.zip")));
        assert_eq!(config.age_window(), (0, 30));
        assert_eq!(config.report_options().histogram_bins, 50);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn bad_files_report_their_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("explorer.json");
        fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("explorer.json"));

        let missing = DashboardConfig::from_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
