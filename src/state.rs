//! State file
//!
//! Persists the canonical id and last-known attributes of every managed
//! object, keyed by address (`{type}.{name}`, or `data.{type}.{name}` for
//! data sources). Writes go to a temporary file that is renamed over the
//! state file.

use crate::resource::{Attributes, ResourceState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Current format version of the state file
pub const STATE_VERSION: u32 = 1;

/// Last known state of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub resource_type: String,
    pub id: String,
    pub attributes: Attributes,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub data_source: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    objects: BTreeMap<String, StateRecord>,
}

/// Address of a resource in the state file
pub fn address(resource_type: &str, name: &str) -> String {
    format!("{}.{}", resource_type, name)
}

/// Address of a data source in the state file
pub fn data_address(data_source_type: &str, name: &str) -> String {
    format!("data.{}.{}", data_source_type, name)
}

/// The state file and its records
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    objects: BTreeMap<String, StateRecord>,
}

impl StateStore {
    /// Load the state at `path`; a missing file is an empty state
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!("No state file at {}, starting empty", path.display());
            return Ok(Self {
                path,
                objects: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let file: StateFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if file.version > STATE_VERSION {
            anyhow::bail!(
                "state file {} has version {}, this build supports up to {}",
                path.display(),
                file.version,
                STATE_VERSION
            );
        }

        tracing::debug!(
            "Loaded {} objects from {}",
            file.objects.len(),
            path.display()
        );

        Ok(Self {
            path,
            objects: file.objects,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the state back atomically
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create state directory: {}", parent.display())
                })?;
            }
        }

        let file = StateFile {
            version: STATE_VERSION,
            objects: self.objects.clone(),
        };
        let content = serde_json::to_string_pretty(&file).context("Failed to serialize state")?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!("Saved {} objects to {}", self.objects.len(), self.path.display());
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<&StateRecord> {
        self.objects.get(address)
    }

    /// Record the outcome of an operation
    pub fn upsert(&mut self, address: String, resource_type: &str, state: ResourceState) {
        self.insert(address, resource_type, state, false);
    }

    /// Record the outcome of a data source read
    pub fn upsert_data_source(&mut self, address: String, data_source_type: &str, state: ResourceState) {
        self.insert(address, data_source_type, state, true);
    }

    fn insert(&mut self, address: String, object_type: &str, state: ResourceState, data_source: bool) {
        self.objects.insert(
            address,
            StateRecord {
                resource_type: object_type.to_string(),
                id: state.id,
                attributes: state.attributes,
                updated_at: Utc::now(),
                data_source,
            },
        );
    }

    pub fn remove(&mut self, address: &str) -> Option<StateRecord> {
        self.objects.remove(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateRecord)> {
        self.objects.iter()
    }

    /// Managed resources only, without data sources
    pub fn resources(&self) -> impl Iterator<Item = (&String, &StateRecord)> {
        self.iter().filter(|(_, record)| !record.data_source)
    }

    /// Data source reads only
    pub fn data_sources(&self) -> impl Iterator<Item = (&String, &StateRecord)> {
        self.iter().filter(|(_, record)| record.data_source)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(id: &str) -> ResourceState {
        ResourceState {
            id: id.to_string(),
            attributes: json!({"name": "policy1", "enabled": true})
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    #[test]
    fn test_addresses() {
        assert_eq!(
            address("azurerm_netapp_snapshot_policy", "main"),
            "azurerm_netapp_snapshot_policy.main"
        );
        assert_eq!(
            data_address("azurerm_aadb2c_directory", "tenant"),
            "data.azurerm_aadb2c_directory.tenant"
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(dir.path().join("state.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_state_persistence_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = StateStore::load(&path).unwrap();
        store.upsert(
            address("azurerm_netapp_snapshot_policy", "main"),
            "azurerm_netapp_snapshot_policy",
            state("/subscriptions/s/policy"),
        );
        store.upsert_data_source(
            data_address("azurerm_aadb2c_directory", "tenant"),
            "azurerm_aadb2c_directory",
            state("/subscriptions/s/directory"),
        );
        store.save().unwrap();
        assert!(!path.with_extension("tmp").exists());

        let loaded = StateStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.resources().count(), 1);
        assert_eq!(
            loaded.data_sources().map(|(address, _)| address.as_str()).collect::<Vec<_>>(),
            vec!["data.azurerm_aadb2c_directory.tenant"]
        );

        let record = loaded.get("azurerm_netapp_snapshot_policy.main").unwrap();
        assert_eq!(record.id, "/subscriptions/s/policy");
        assert_eq!(record.attributes["enabled"], json!(true));
        assert!(!record.data_source);
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = StateStore::load(dir.path().join("state.json")).unwrap();
        store.upsert("a.b".to_string(), "a", state("/x"));
        assert!(store.remove("a.b").is_some());
        assert!(store.remove("a.b").is_none());
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"version": 99, "objects": {}}"#).unwrap();
        assert!(StateStore::load(&path).is_err());
    }
}
