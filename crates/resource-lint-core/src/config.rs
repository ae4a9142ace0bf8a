//! Configuration types for resource-lint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::Severity;

/// Top-level configuration for resource-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Package loading configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Change tracking configuration.
    #[serde(default)]
    pub changes: ChangesConfig,

    /// Per-check configurations, keyed by analyzer name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a check is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        self.rules
            .get(name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a check.
    #[must_use]
    pub fn rule_severity(&self, name: &str) -> Option<Severity> {
        self.rules.get(name).and_then(|c| c.severity)
    }
}

/// Package loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns over file paths that are never loaded.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether `_test.go` files of root packages are loaded.
    #[serde(default = "default_true")]
    pub include_tests: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_tests: true,
        }
    }
}

/// Change tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesConfig {
    /// Directory prefix that change set paths are normalized against.
    #[serde(default = "default_service_prefix")]
    pub service_prefix: String,

    /// Base branch when neither `--base` nor upstream config names one.
    #[serde(default = "default_base")]
    pub default_base: String,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            service_prefix: default_service_prefix(),
            default_base: default_base(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_service_prefix() -> String {
    resource_lint_changes::SERVICE_PATH_PREFIX.to_owned()
}

fn default_base() -> String {
    "main".to_owned()
}

/// Per-check configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Whether this check is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check.
    #[serde(default)]
    pub severity: Option<Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
