// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fact collection
//!
//! Facts are named values the agent pulls on every run. Each provider reads
//! its source fresh; a missing source means the fact is absent, never an
//! error.

mod hosts;
mod pubkey;

pub use hosts::{hosts_fact, parse_hosts};
pub use pubkey::{key_material, pubkey_fact, PublicKey};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::FactsConfig;
use crate::error::{BackuppcError, Result};

/// Hosts registered with the BackupPC server
pub const HOSTS_FACT: &str = "backuppc_hosts";

/// Key material of the BackupPC service account's RSA key
pub const PUBKEY_FACT: &str = "backuppc_pubkey_rsa";

/// A published fact value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    String(String),
    List(Vec<String>),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::String(value) => f.write_str(value),
            FactValue::List(values) => f.write_str(&values.join(",")),
        }
    }
}

/// Collected facts, keyed by name. Absent facts have no entry.
pub type Facts = BTreeMap<String, FactValue>;

/// A fact provider
pub type Provider = Box<dyn Fn() -> Option<FactValue> + Send + Sync>;

/// Named fact providers, queried on demand
#[derive(Default)]
pub struct FactRegistry {
    providers: BTreeMap<String, Provider>,
}

impl FactRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the BackupPC facts bound to the configured paths
    pub fn standard(config: &FactsConfig) -> Self {
        let mut registry = Self::new();

        let hosts_file = config.hosts_file.clone();
        registry.register(HOSTS_FACT, move || {
            hosts_fact(&hosts_file).map(FactValue::List)
        });

        let pubkey_file = config.pubkey_file.clone();
        registry.register(PUBKEY_FACT, move || {
            pubkey_fact(&pubkey_file).map(FactValue::String)
        });

        registry
    }

    /// Register a provider. An existing provider with the same name is replaced.
    pub fn register<F>(&mut self, name: &str, provider: F)
    where
        F: Fn() -> Option<FactValue> + Send + Sync + 'static,
    {
        self.providers.insert(name.to_string(), Box::new(provider));
    }

    /// Registered fact names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Resolve a single fact
    pub fn resolve(&self, name: &str) -> Result<Option<FactValue>> {
        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| BackuppcError::UnknownFact {
                name: name.to_string(),
            })?;

        let value = provider();
        debug!(fact = %name, present = value.is_some(), "Resolved fact");
        Ok(value)
    }

    /// Resolve every registered fact, dropping the absent ones
    pub fn collect(&self) -> Facts {
        self.providers
            .iter()
            .filter_map(|(name, provider)| {
                let value = provider();
                debug!(fact = %name, present = value.is_some(), "Resolved fact");
                value.map(|value| (name.clone(), value))
            })
            .collect()
    }

    /// Resolve only the named facts. Unknown names fail the whole call.
    pub fn collect_named(&self, names: &[String]) -> Result<Facts> {
        let mut facts = Facts::new();
        for name in names {
            if let Some(value) = self.resolve(name)? {
                facts.insert(name.clone(), value);
            }
        }
        Ok(facts)
    }
}

/// Render facts as `name=value` lines, lists comma-joined
pub fn render_text(facts: &Facts) -> String {
    facts
        .iter()
        .map(|(name, value)| format!("{}={}\n", name, value))
        .collect()
}

/// Read a fact source. `None` when the file is missing or unreadable.
pub(crate) fn read_source(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!(path = %path.display(), "Fact source not present");
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read fact source");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> FactsConfig {
        FactsConfig {
            hosts_file: dir.join("hosts"),
            pubkey_file: dir.join("id_rsa.pub"),
        }
    }

    #[test]
    fn test_standard_registry_names() {
        let registry = FactRegistry::standard(&FactsConfig::default());
        assert_eq!(registry.names(), vec![HOSTS_FACT, PUBKEY_FACT]);
    }

    #[test]
    fn test_collect_with_no_sources() {
        let temp_dir = tempdir().unwrap();
        let registry = FactRegistry::standard(&config_in(temp_dir.path()));
        assert!(registry.collect().is_empty());
    }

    #[test]
    fn test_collect_both_facts() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("hosts"),
            "host ip\nalpha 10.0.0.1\nbeta 10.0.0.2\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("id_rsa.pub"),
            "ssh-rsa AAAAB3NzaC1yc2EA backuppc@server\n",
        )
        .unwrap();

        let registry = FactRegistry::standard(&config_in(temp_dir.path()));
        let facts = registry.collect();

        assert_eq!(
            facts.get(HOSTS_FACT),
            Some(&FactValue::List(vec!["alpha".to_string(), "beta".to_string()]))
        );
        assert_eq!(
            facts.get(PUBKEY_FACT),
            Some(&FactValue::String("AAAAB3NzaC1yc2EA".to_string()))
        );
    }

    #[test]
    fn test_resolve_unknown_fact() {
        let registry = FactRegistry::new();
        let err = registry.resolve("osfamily").unwrap_err();
        assert!(matches!(err, BackuppcError::UnknownFact { .. }));
    }

    #[test]
    fn test_register_replaces_provider() {
        let mut registry = FactRegistry::new();
        registry.register("role", || Some(FactValue::String("client".to_string())));
        registry.register("role", || Some(FactValue::String("server".to_string())));

        assert_eq!(registry.names(), vec!["role"]);
        assert_eq!(
            registry.resolve("role").unwrap(),
            Some(FactValue::String("server".to_string()))
        );
    }

    #[test]
    fn test_collect_named_skips_absent() {
        let mut registry = FactRegistry::new();
        registry.register("present", || Some(FactValue::String("yes".to_string())));
        registry.register("absent", || None);

        let facts = registry
            .collect_named(&["present".to_string(), "absent".to_string()])
            .unwrap();
        assert_eq!(facts.len(), 1);
        assert!(facts.contains_key("present"));

        assert!(registry.collect_named(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_json_shape() {
        let mut facts = Facts::new();
        facts.insert(
            HOSTS_FACT.to_string(),
            FactValue::List(vec!["alpha".to_string()]),
        );
        facts.insert(PUBKEY_FACT.to_string(), FactValue::String("AAAA".to_string()));

        let json = serde_json::to_string(&facts).unwrap();
        assert_eq!(
            json,
            r#"{"backuppc_hosts":["alpha"],"backuppc_pubkey_rsa":"AAAA"}"#
        );
    }

    #[test]
    fn test_render_text() {
        let mut facts = Facts::new();
        facts.insert(
            HOSTS_FACT.to_string(),
            FactValue::List(vec!["alpha".to_string(), "beta".to_string()]),
        );
        facts.insert(PUBKEY_FACT.to_string(), FactValue::String("AAAA".to_string()));

        assert_eq!(
            render_text(&facts),
            "backuppc_hosts=alpha,beta\nbackuppc_pubkey_rsa=AAAA\n"
        );
    }

    #[test]
    fn test_read_source_missing() {
        let temp_dir = tempdir().unwrap();
        assert!(read_source(&temp_dir.path().join("nope")).is_none());
    }

    #[test]
    fn test_read_source_directory_is_absent() {
        let temp_dir = tempdir().unwrap();
        // exists, but reading a directory fails
        assert!(read_source(temp_dir.path()).is_none());
    }
}
