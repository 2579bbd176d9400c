// SPDX-License-Identifier: AGPL-3.0-or-later
//! OS family dispatch
//!
//! Package names and file locations differ between Debian and RedHat
//! derived systems. Everything else is rejected up front.

use std::fmt;

use crate::error::{BackuppcError, Result};

/// Class holding the per-platform parameters, included by every role
pub const PARAMS_CLASS: &str = "backuppc::params";

/// Supported OS families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Debian,
    RedHat,
}

impl OsFamily {
    /// Map the agent's `osfamily` fact. `module` names the class asking, for
    /// the error message.
    pub fn from_fact(module: &str, osfamily: &str) -> Result<Self> {
        match osfamily.trim().to_ascii_lowercase().as_str() {
            "debian" => Ok(OsFamily::Debian),
            "redhat" => Ok(OsFamily::RedHat),
            _ => Err(BackuppcError::UnsupportedPlatform {
                module: module.to_string(),
                osfamily: osfamily.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Debian => "Debian",
            OsFamily::RedHat => "RedHat",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Package names and paths for one OS family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformParams {
    pub family: OsFamily,
    pub server_package: &'static str,
    pub client_package: &'static str,
    pub service: &'static str,
    pub config_dir: &'static str,
    pub config_file: &'static str,
    pub hosts_file: &'static str,
    pub htpasswd_file: &'static str,
    pub apache_config: &'static str,
    /// BackupPC data directory, also the service account's home
    pub topdir: &'static str,
    pub system_account: &'static str,
    /// Group the web server runs as
    pub web_group: &'static str,
}

const DEBIAN: PlatformParams = PlatformParams {
    family: OsFamily::Debian,
    server_package: "backuppc",
    client_package: "rsync",
    service: "backuppc",
    config_dir: "/etc/backuppc",
    config_file: "/etc/backuppc/config.pl",
    hosts_file: "/etc/backuppc/hosts",
    htpasswd_file: "/etc/backuppc/htpasswd",
    apache_config: "/etc/backuppc/apache.conf",
    topdir: "/var/lib/backuppc",
    system_account: "backuppc",
    web_group: "www-data",
};

const REDHAT: PlatformParams = PlatformParams {
    family: OsFamily::RedHat,
    server_package: "BackupPC",
    client_package: "rsync",
    service: "backuppc",
    config_dir: "/etc/BackupPC",
    config_file: "/etc/BackupPC/config.pl",
    hosts_file: "/etc/BackupPC/hosts",
    htpasswd_file: "/etc/BackupPC/apache.users",
    apache_config: "/etc/httpd/conf.d/BackupPC.conf",
    topdir: "/var/lib/BackupPC",
    system_account: "backuppc",
    web_group: "apache",
};

impl PlatformParams {
    pub fn for_family(family: OsFamily) -> Self {
        match family {
            OsFamily::Debian => DEBIAN,
            OsFamily::RedHat => REDHAT,
        }
    }

    /// Validate `osfamily` and look up its parameters in one step
    pub fn resolve(module: &str, osfamily: &str) -> Result<Self> {
        OsFamily::from_fact(module, osfamily).map(Self::for_family)
    }
}

/// Pull the OS family out of an agent facts document.
///
/// Accepts the legacy flat `osfamily` fact and the structured `os.family`.
pub fn osfamily_from_facts(document: &serde_json::Value) -> Option<&str> {
    document
        .get("osfamily")
        .and_then(serde_json::Value::as_str)
        .or_else(|| document.pointer("/os/family").and_then(serde_json::Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fact_known_families() {
        assert_eq!(OsFamily::from_fact("m", "Debian").unwrap(), OsFamily::Debian);
        assert_eq!(OsFamily::from_fact("m", "RedHat").unwrap(), OsFamily::RedHat);
        assert_eq!(OsFamily::from_fact("m", "redhat").unwrap(), OsFamily::RedHat);
        assert_eq!(OsFamily::from_fact("m", " debian\n").unwrap(), OsFamily::Debian);
    }

    #[test]
    fn test_from_fact_unknown_family() {
        for osfamily in ["Unknown", "Suse", "", "Debianish"] {
            let err = OsFamily::from_fact("backuppc::server", osfamily).unwrap_err();
            assert!(err.is_unsupported_platform());
            assert!(err.to_string().contains("backuppc::server"));
            assert!(err.to_string().contains("not supported"));
        }
    }

    #[test]
    fn test_debian_params() {
        let params = PlatformParams::resolve("backuppc::server", "Debian").unwrap();
        assert_eq!(params.server_package, "backuppc");
        assert_eq!(params.config_file, "/etc/backuppc/config.pl");
        assert_eq!(params.web_group, "www-data");
    }

    #[test]
    fn test_redhat_params() {
        let params = PlatformParams::resolve("backuppc::server", "RedHat").unwrap();
        assert_eq!(params.server_package, "BackupPC");
        assert_eq!(params.config_file, "/etc/BackupPC/config.pl");
        assert_eq!(params.apache_config, "/etc/httpd/conf.d/BackupPC.conf");
    }

    #[test]
    fn test_paths_live_under_config_dir() {
        for family in [OsFamily::Debian, OsFamily::RedHat] {
            let params = PlatformParams::for_family(family);
            assert!(params.config_file.starts_with(params.config_dir));
            assert!(params.hosts_file.starts_with(params.config_dir));
            assert!(params.htpasswd_file.starts_with(params.config_dir));
        }
    }

    #[test]
    fn test_osfamily_from_facts() {
        let flat = serde_json::json!({"osfamily": "Debian", "fqdn": "web01"});
        assert_eq!(osfamily_from_facts(&flat), Some("Debian"));

        let structured = serde_json::json!({"os": {"family": "RedHat", "name": "Rocky"}});
        assert_eq!(osfamily_from_facts(&structured), Some("RedHat"));

        assert_eq!(osfamily_from_facts(&serde_json::json!({"fqdn": "web01"})), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(OsFamily::RedHat.to_string(), "RedHat");
    }
}
