// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration management for backuppc-host

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BackuppcError, Result};

/// Default contents written by `backuppc-host init`
pub const DEFAULT_CONFIG: &str = r#"# SPDX-License-Identifier: AGPL-3.0-or-later
# backuppc-host configuration

name = "backuppc-host"

[facts]
hosts_file = "/etc/backuppc/hosts"
pubkey_file = "/var/lib/backuppc/.ssh/id_rsa.pub"

[logging]
level = "warn"
format = "text"
"#;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instance name, used in log output
    pub name: String,

    /// Where the fact providers read from
    #[serde(default)]
    pub facts: FactsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source files for the fact providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsConfig {
    /// BackupPC host registry (header line, then one host per line)
    #[serde(default = "default_hosts_file")]
    pub hosts_file: PathBuf,

    /// OpenSSH public key of the BackupPC service account
    #[serde(default = "default_pubkey_file")]
    pub pubkey_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            hosts_file: default_hosts_file(),
            pubkey_file: default_pubkey_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "backuppc-host".to_string(),
            facts: FactsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BackuppcError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BackuppcError::InvalidConfig {
                message: "name cannot be empty".to_string(),
            });
        }

        if self.facts.hosts_file.as_os_str().is_empty() {
            return Err(BackuppcError::InvalidConfig {
                message: "facts.hosts_file cannot be empty".to_string(),
            });
        }

        if self.facts.pubkey_file.as_os_str().is_empty() {
            return Err(BackuppcError::InvalidConfig {
                message: "facts.pubkey_file cannot be empty".to_string(),
            });
        }

        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(BackuppcError::InvalidConfig {
                    message: format!("unknown logging.format '{}' (expected text or json)", other),
                })
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(BackuppcError::InvalidConfig {
                    message: format!(
                        "unknown logging.level '{}' (expected trace, debug, info, warn or error)",
                        other
                    ),
                })
            }
        }

        Ok(())
    }
}

// Default value functions

fn default_hosts_file() -> PathBuf {
    PathBuf::from("/etc/backuppc/hosts")
}

fn default_pubkey_file() -> PathBuf {
    PathBuf::from("/var/lib/backuppc/.ssh/id_rsa.pub")
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
