//! Configuration management for debtweb
//!
//! This module handles loading, validation, and management of
//! debtweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the workbook and the JSON store
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Debt workbook file name
    #[serde(default = "default_workbook_file")]
    pub workbook_file: String,
    /// Stored debts file name
    #[serde(default = "default_store_file")]
    pub store_file: String,
    /// Manual status overrides file name
    #[serde(default = "default_overrides_file")]
    pub overrides_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            workbook_file: default_workbook_file(),
            store_file: default_store_file(),
            overrides_file: default_overrides_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_workbook_file() -> String {
    "ExcelDeudas.xlsx".to_string()
}

fn default_store_file() -> String {
    "debts.json".to_string()
}

fn default_overrides_file() -> String {
    "debt_overrides.json".to_string()
}

/// How an import is combined with the debts already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Discard stored debts and their overrides
    Replace,
    /// Keep stored debts, add only records not seen before
    Append,
}

impl Default for MergeMode {
    fn default() -> Self {
        MergeMode::Replace
    }
}

impl std::str::FromStr for MergeMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(MergeMode::Replace),
            "append" => Ok(MergeMode::Append),
            _ => Err(format!("Invalid merge mode: {}", s)),
        }
    }
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMode::Replace => write!(f, "replace"),
            MergeMode::Append => write!(f, "append"),
        }
    }
}

/// Spreadsheet import rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// First-cell titles that open a creditor section
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,
    /// Column title of the due-date column in each loan pair
    #[serde(default = "default_date_header")]
    pub date_header: String,
    /// Marker of advance-payment rows
    #[serde(default = "default_exclusion_marker")]
    pub exclusion_marker: String,
    /// Fill colour codes that mean "paid"
    #[serde(default = "default_paid_fills")]
    pub paid_fills: Vec<String>,
    /// Merge mode used when a request does not name one
    #[serde(default)]
    pub default_mode: MergeMode,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            entities: default_entities(),
            date_header: default_date_header(),
            exclusion_marker: default_exclusion_marker(),
            paid_fills: default_paid_fills(),
            default_mode: MergeMode::default(),
        }
    }
}

fn default_entities() -> Vec<String> {
    ["GALICIA", "UALA", "MERCADO PAGO", "ICBC"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_date_header() -> String {
    "FECHA".to_string()
}

fn default_exclusion_marker() -> String {
    "PAGOANTICIPADO".to_string()
}

fn default_paid_fills() -> Vec<String> {
    ["6AA84F", "34A853", "00B050", "92D050", "00FF00"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Spreadsheet import rules
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML file, falling back to defaults when it is absent
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        match Self::load(path.to_path_buf()) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.import.entities.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "import.entities".to_string(),
                reason: "At least one entity name is required".to_string(),
            });
        }

        if self.import.date_header.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "import.date_header".to_string(),
            });
        }

        if let Some(bad) = self
            .import
            .paid_fills
            .iter()
            .find(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(ConfigError::InvalidValue {
                field: "import.paid_fills".to_string(),
                reason: format!("'{}' is not a hex colour code", bad),
            });
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: "Level must be one of trace, debug, info, warn, error, off".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path to the debt workbook
    pub fn workbook_path(&self) -> PathBuf {
        self.data.path.join(&self.data.workbook_file)
    }

    /// Full path to the stored debts file
    pub fn store_path(&self) -> PathBuf {
        self.data.path.join(&self.data.store_file)
    }

    /// Full path to the status overrides file
    pub fn overrides_path(&self) -> PathBuf {
        self.data.path.join(&self.data.overrides_file)
    }
}
