// SPDX-License-Identifier: AGPL-3.0-or-later
//! `backuppc::server`: the BackupPC server with its web interface

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::platform::{PlatformParams, PARAMS_CLASS};
use super::{Catalog, File, Package, Sensitive, Service};
use crate::error::{BackuppcError, Result};

pub const SERVER_CLASS: &str = "backuppc::server";

/// Parameters of the server role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerParams {
    /// Password for the web interface
    pub backuppc_password: Sensitive,

    /// Web interface login, also the CGI admin user
    #[serde(default = "default_backuppc_user")]
    pub backuppc_user: String,
}

impl ServerParams {
    pub fn new(backuppc_password: impl Into<String>) -> Self {
        Self {
            backuppc_password: Sensitive::new(backuppc_password),
            backuppc_user: default_backuppc_user(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.backuppc_password.is_empty() {
            return Err(BackuppcError::MissingParameter {
                class: SERVER_CLASS.to_string(),
                name: "backuppc_password".to_string(),
            });
        }

        if self.backuppc_user.trim().is_empty() {
            return Err(BackuppcError::MissingParameter {
                class: SERVER_CLASS.to_string(),
                name: "backuppc_user".to_string(),
            });
        }

        Ok(())
    }
}

pub(super) fn compile(osfamily: &str, params: &ServerParams) -> Result<Catalog> {
    let platform = PlatformParams::resolve(SERVER_CLASS, osfamily)?;
    params.validate()?;

    debug!(osfamily = %platform.family, "Compiling server catalog");

    let account = platform.system_account;
    let mut catalog = Catalog::new();
    catalog.include_class(PARAMS_CLASS);
    catalog.include_class(SERVER_CLASS);

    catalog.add(Package::present(platform.server_package))?;

    catalog.add(
        File::directory(platform.config_dir)
            .owner(account)
            .group(account)
            .mode("0755"),
    )?;

    catalog.add(
        File::file(platform.config_file)
            .owner(account)
            .group(account)
            .mode("0640")
            .template("backuppc/config.pl")
            .param("topdir", platform.topdir)
            .param("cgi_admin_users", &params.backuppc_user),
    )?;

    catalog.add(
        File::file(platform.hosts_file)
            .owner(account)
            .group(account)
            .mode("0644"),
    )?;

    catalog.add(
        File::file(platform.htpasswd_file)
            .owner("root")
            .group(platform.web_group)
            .mode("0640")
            .template("backuppc/htpasswd")
            .param("user", &params.backuppc_user)
            .sensitive_param("password", params.backuppc_password.clone()),
    )?;

    catalog.add(
        File::file(platform.apache_config)
            .owner("root")
            .group("root")
            .mode("0644")
            .template("backuppc/apache.conf")
            .param("htpasswd_file", platform.htpasswd_file),
    )?;

    catalog.add(
        File::directory(Path::new(platform.topdir).join(".ssh"))
            .owner(account)
            .group(account)
            .mode("0700"),
    )?;

    catalog.add(Service::running(platform.service))?;

    Ok(catalog)
}

fn default_backuppc_user() -> String {
    "backuppc".to_string()
}
