// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for backuppc-host

use thiserror::Error;

/// Result type alias for backuppc-host operations
pub type Result<T> = std::result::Result<T, BackuppcError>;

/// Errors that can occur while collecting facts or compiling catalogs
///
/// A missing source file is not an error: the affected fact is simply absent.
#[derive(Error, Debug)]
pub enum BackuppcError {
    /// The host's OS family has no known package/path set
    #[error("{module}: osfamily '{osfamily}' is not supported by this module")]
    UnsupportedPlatform { module: String, osfamily: String },

    /// A required role parameter was empty or missing
    #[error("{class}: parameter '{name}' must be set")]
    MissingParameter { class: String, name: String },

    /// A role parameter was set to an unusable value
    #[error("{class}: parameter '{name}' {message}")]
    InvalidParameter {
        class: String,
        name: String,
        message: String,
    },

    /// Two resources in one catalog share an identity
    #[error("Duplicate declaration: {resource} is already declared")]
    DuplicateResource { resource: String },

    /// No provider is registered under this fact name
    #[error("Unknown fact: {name}")]
    UnknownFact { name: String },

    /// Public key line could not be interpreted
    #[error("Invalid public key: {message}")]
    InvalidPublicKey { message: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BackuppcError {
    /// Whether this error is the fatal unsupported-platform condition
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, BackuppcError::UnsupportedPlatform { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = BackuppcError::UnsupportedPlatform {
            module: "backuppc::server".to_string(),
            osfamily: "Solaris".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("backuppc::server"));
        assert!(message.contains("is not supported by this module"));
        assert!(err.is_unsupported_platform());
    }

    #[test]
    fn test_missing_parameter_message() {
        let err = BackuppcError::MissingParameter {
            class: "backuppc::client".to_string(),
            name: "backuppc_hostname".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backuppc::client: parameter 'backuppc_hostname' must be set"
        );
        assert!(!err.is_unsupported_platform());
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = BackuppcError::InvalidParameter {
            class: "backuppc::client".to_string(),
            name: "backup_user_home".to_string(),
            message: "must be an absolute path, got 'root'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backuppc::client: parameter 'backup_user_home' must be an absolute path, got 'root'"
        );
    }
}
