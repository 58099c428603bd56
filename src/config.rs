// Application configuration: built-in defaults, optional TOML file, CLI overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::filter::Hour;
use crate::data::loader::DataSource;

/// September 2014 NYC pickups, gzip-compressed CSV.
pub const DATA_URL: &str =
    "https://s3-us-west-2.amazonaws.com/streamlit-demo-data/uber-raw-data-sep14.csv.gz";

/// Timestamp column of [`DATA_URL`] after lower-casing.
pub const DATE_COLUMN: &str = "date/time";

/// Rows loaded unless configured otherwise.
pub const DEFAULT_NROWS: usize = 10_000;

/// Hour selected on start-up.
pub const DEFAULT_HOUR: u8 = 17;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Every key is optional in the file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// URL or local path of the CSV.
    pub source: String,
    /// Maximum rows to load; `0` loads everything.
    pub nrows: usize,
    pub date_column: String,
    pub initial_hour: u8,
    pub show_raw_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: DATA_URL.to_string(),
            nrows: DEFAULT_NROWS,
            date_column: DATE_COLUMN.to_string(),
            initial_hour: DEFAULT_HOUR,
            show_raw_data: false,
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|err| match err {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text).map_err(|source| ConfigError::ParseError {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(err) = Hour::new(self.initial_hour) {
            return Err(ConfigError::ValidationError {
                field: "initial_hour".into(),
                message: err.to_string(),
            });
        }
        if self.source.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "source".into(),
                message: "must not be empty".into(),
            });
        }
        if self.date_column.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "date_column".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Apply command-line values on top of this config.
    pub fn with_overrides(mut self, source: Option<String>, nrows: Option<usize>) -> Self {
        if let Some(source) = source {
            self.source = source;
        }
        if let Some(nrows) = nrows {
            self.nrows = nrows;
        }
        self
    }

    pub fn data_source(&self) -> DataSource {
        match self.source.parse::<DataSource>() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }

    /// Row limit for the loader; `None` means all rows.
    pub fn row_limit(&self) -> Option<usize> {
        (self.nrows > 0).then_some(self.nrows)
    }
}
