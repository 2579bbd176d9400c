// SPDX-License-Identifier: AGPL-3.0-or-later
//! Role catalogs
//!
//! A role compiles to a [`Catalog`]: the classes it pulls in and an ordered
//! list of package, file and service declarations. Applying the catalog is
//! the reconciliation engine's job, not ours.

mod client;
mod platform;
mod server;

pub use client::{ClientParams, CLIENT_CLASS};
pub use platform::{osfamily_from_facts, OsFamily, PlatformParams, PARAMS_CLASS};
pub use server::{ServerParams, SERVER_CLASS};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{BackuppcError, Result};

/// A role to compile, with its parameters
#[derive(Debug, Clone)]
pub enum Role {
    Client(ClientParams),
    Server(ServerParams),
}

impl Role {
    /// Class name of the role
    pub fn class(&self) -> &'static str {
        match self {
            Role::Client(_) => CLIENT_CLASS,
            Role::Server(_) => SERVER_CLASS,
        }
    }
}

/// Compile `role` for a host reporting `osfamily`
pub fn compile(osfamily: &str, role: &Role) -> Result<Catalog> {
    match role {
        Role::Client(params) => client::compile(osfamily, params),
        Role::Server(params) => server::compile(osfamily, params),
    }
}

/// A string that must not show up in logs or debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive(String);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The wrapped value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive([redacted])")
    }
}

/// Value handed to a file template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Plain(String),
    Sensitive { sensitive: Sensitive },
}

impl ParamValue {
    /// The underlying string, sensitive or not
    pub fn expose(&self) -> &str {
        match self {
            ParamValue::Plain(value) => value,
            ParamValue::Sensitive { sensitive } => sensitive.expose(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageEnsure {
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEnsure {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceEnsure {
    Running,
}

/// Package declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub ensure: PackageEnsure,
}

impl Package {
    /// Package that must be installed
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: PackageEnsure::Present,
        }
    }
}

/// File or directory declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: PathBuf,

    pub ensure: FileEnsure,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Octal mode string, e.g. `0640`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Template the engine renders into the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Values for the template
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl File {
    /// Regular file at `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_ensure(path, FileEnsure::File)
    }

    /// Directory at `path`
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::with_ensure(path, FileEnsure::Directory)
    }

    fn with_ensure(path: impl Into<PathBuf>, ensure: FileEnsure) -> Self {
        Self {
            path: path.into(),
            ensure,
            owner: None,
            group: None,
            mode: None,
            template: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.parameters
            .insert(key.to_string(), ParamValue::Plain(value.into()));
        self
    }

    pub fn sensitive_param(mut self, key: &str, value: Sensitive) -> Self {
        self.parameters
            .insert(key.to_string(), ParamValue::Sensitive { sensitive: value });
        self
    }
}

/// Service declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub ensure: ServiceEnsure,
    pub enable: bool,
}

impl Service {
    /// Service that runs now and on boot
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: ServiceEnsure::Running,
            enable: true,
        }
    }
}

/// One node of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Resource {
    Package(Package),
    File(File),
    Service(Service),
}

impl Resource {
    /// Reference such as `Package[backuppc]`, unique within a catalog
    pub fn reference(&self) -> String {
        match self {
            Resource::Package(package) => format!("Package[{}]", package.name),
            Resource::File(file) => format!("File[{}]", file.path.display()),
            Resource::Service(service) => format!("Service[{}]", service.name),
        }
    }
}

impl From<Package> for Resource {
    fn from(package: Package) -> Self {
        Resource::Package(package)
    }
}

impl From<File> for Resource {
    fn from(file: File) -> Self {
        Resource::File(file)
    }
}

impl From<Service> for Resource {
    fn from(service: Service) -> Self {
        Resource::Service(service)
    }
}

/// Compiled classes and resources for one host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub classes: Vec<String>,
    pub resources: Vec<Resource>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a class. Including a class twice is a no-op.
    pub fn include_class(&mut self, class: &str) {
        if !self.contains_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Append a resource, rejecting a second declaration of the same reference
    pub fn add(&mut self, resource: impl Into<Resource>) -> Result<()> {
        let resource = resource.into();
        let reference = resource.reference();

        if self.resources.iter().any(|r| r.reference() == reference) {
            return Err(BackuppcError::DuplicateResource {
                resource: reference,
            });
        }

        self.resources.push(resource);
        Ok(())
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.resources.iter().find_map(|r| match r {
            Resource::Package(package) if package.name == name => Some(package),
            _ => None,
        })
    }

    pub fn file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        let path = path.as_ref();
        self.resources.iter().find_map(|r| match r {
            Resource::File(file) if file.path == path => Some(file),
            _ => None,
        })
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.resources.iter().find_map(|r| match r {
            Resource::Service(service) if service.name == name => Some(service),
            _ => None,
        })
    }

    /// Pretty JSON for the reconciliation engine
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
