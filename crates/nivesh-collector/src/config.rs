//! Application configuration.
//!
//! The data directory is an explicit value handed to each pipeline entry
//! point: set once at load time, read-only thereafter.

use crate::error::{AppError, AppResult};
use nivesh_ingest::FlowSourceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the dataset files. Default: `data`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// FII/DII upstream endpoints and pacing.
    #[serde(default)]
    pub fii_dii: FlowSourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fii_dii: FlowSourceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("NIVESH_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.fii_dii.json_urls.len(), 2);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/tmp/nivesh\"").unwrap();
        writeln!(file, "[fii_dii]").unwrap();
        writeln!(file, "courtesy_delay_ms = 100").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/nivesh"));
        assert_eq!(config.fii_dii.courtesy_delay_ms, 100);
        assert_eq!(config.fii_dii.request_timeout_secs, 20);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(AppConfig::from_file("/does/not/exist.toml").is_err());
    }
}
