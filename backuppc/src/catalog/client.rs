// SPDX-License-Identifier: AGPL-3.0-or-later
//! `backuppc::client`: a host that the BackupPC server backs up over rsync/ssh

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::platform::{PlatformParams, PARAMS_CLASS};
use super::{Catalog, File, Package};
use crate::error::{BackuppcError, Result};

pub const CLIENT_CLASS: &str = "backuppc::client";

/// Parameters of the client role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    /// Server allowed to log in and pull backups
    pub backuppc_hostname: String,

    /// Server key material, usually its `backuppc_pubkey_rsa` fact
    #[serde(default)]
    pub pubkey: Option<String>,

    /// Account the server logs in as
    #[serde(default = "default_backup_user")]
    pub backup_user: String,

    #[serde(default = "default_backup_user_home")]
    pub backup_user_home: PathBuf,
}

impl ClientParams {
    pub fn new(backuppc_hostname: impl Into<String>) -> Self {
        Self {
            backuppc_hostname: backuppc_hostname.into(),
            pubkey: None,
            backup_user: default_backup_user(),
            backup_user_home: default_backup_user_home(),
        }
    }

    pub fn with_pubkey(mut self, pubkey: impl Into<String>) -> Self {
        self.pubkey = Some(pubkey.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.backuppc_hostname.trim().is_empty() {
            return Err(BackuppcError::MissingParameter {
                class: CLIENT_CLASS.to_string(),
                name: "backuppc_hostname".to_string(),
            });
        }

        if self.backup_user.trim().is_empty() {
            return Err(BackuppcError::MissingParameter {
                class: CLIENT_CLASS.to_string(),
                name: "backup_user".to_string(),
            });
        }

        if self.backup_user_home.as_os_str().is_empty() {
            return Err(BackuppcError::MissingParameter {
                class: CLIENT_CLASS.to_string(),
                name: "backup_user_home".to_string(),
            });
        }

        // .ssh and authorized_keys are declared under it
        if !self.backup_user_home.is_absolute() {
            return Err(BackuppcError::InvalidParameter {
                class: CLIENT_CLASS.to_string(),
                name: "backup_user_home".to_string(),
                message: format!(
                    "must be an absolute path, got '{}'",
                    self.backup_user_home.display()
                ),
            });
        }

        Ok(())
    }
}

pub(super) fn compile(osfamily: &str, params: &ClientParams) -> Result<Catalog> {
    let platform = PlatformParams::resolve(CLIENT_CLASS, osfamily)?;
    params.validate()?;

    debug!(
        osfamily = %platform.family,
        server = %params.backuppc_hostname,
        "Compiling client catalog"
    );

    let mut catalog = Catalog::new();
    catalog.include_class(PARAMS_CLASS);
    catalog.include_class(CLIENT_CLASS);

    catalog.add(Package::present(platform.client_package))?;

    let ssh_dir = params.backup_user_home.join(".ssh");
    catalog.add(
        File::directory(&ssh_dir)
            .owner(&params.backup_user)
            .group(&params.backup_user)
            .mode("0700"),
    )?;

    if let Some(pubkey) = params.pubkey.as_deref().filter(|k| !k.is_empty()) {
        catalog.add(
            File::file(ssh_dir.join("authorized_keys"))
                .owner(&params.backup_user)
                .group(&params.backup_user)
                .mode("0600")
                .template("backuppc/authorized_keys")
                .param("algorithm", "ssh-rsa")
                .param("from", &params.backuppc_hostname)
                .param("key", pubkey),
        )?;
    }

    Ok(catalog)
}

fn default_backup_user() -> String {
    "root".to_string()
}

fn default_backup_user_home() -> PathBuf {
    PathBuf::from("/root")
}
