//! Configuration documents
//!
//! A document lists the resources to manage and the data sources to read:
//!
//! ```yaml
//! resources:
//!   - type: azurerm_netapp_snapshot_policy
//!     name: main
//!     config:
//!       name: snapshotpolicy1
//!       enabled: true
//! data:
//!   - type: azurerm_aadb2c_directory
//!     name: tenant
//!     config:
//!       domain_name: contoso.onmicrosoft.com
//!       resource_group_name: example-resource-group
//! ```
//!
//! Files ending in `.json` are read as JSON, everything else as YAML.

use crate::resource::Attributes;
use crate::state::{address, data_address};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One declared object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub object_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub resources: Vec<Block>,
    #[serde(default)]
    pub data: Vec<Block>,
}

impl Block {
    pub fn address(&self) -> String {
        address(&self.object_type, &self.name)
    }

    pub fn data_address(&self) -> String {
        data_address(&self.object_type, &self.name)
    }
}

impl Document {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let document = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
        .with_context(|| format!("parsing {}", path.display()))?;

        document.check()?;
        Ok(document)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Names must be non-empty and addresses unique
    pub fn check(&self) -> Result<()> {
        let mut seen = BTreeSet::new();

        let addresses = self
            .resources
            .iter()
            .map(|block| (block, block.address()))
            .chain(self.data.iter().map(|block| (block, block.data_address())));

        for (block, address) in addresses {
            if block.name.trim().is_empty() {
                bail!("{} has an empty name", block.object_type);
            }
            if !seen.insert(address.clone()) {
                bail!("{} is declared more than once", address);
            }
        }

        Ok(())
    }

    pub fn resource(&self, address: &str) -> Option<&Block> {
        self.resources.iter().find(|block| block.address() == address)
    }

    pub fn data_source(&self, address: &str) -> Option<&Block> {
        self.data.iter().find(|block| block.data_address() == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML: &str = r#"
resources:
  - type: azurerm_netapp_snapshot_policy
    name: main
    config:
      name: snapshotpolicy1
      enabled: true
      daily_schedule:
        snapshots_to_keep: 1
        hour: 2
        minute: 3
data:
  - type: azurerm_aadb2c_directory
    name: tenant
    config:
      domain_name: contoso.onmicrosoft.com
      resource_group_name: example-resource-group
"#;

    #[test]
    fn test_yaml_document() {
        let document = Document::from_yaml(YAML).unwrap();
        document.check().unwrap();

        let policy = document.resource("azurerm_netapp_snapshot_policy.main").unwrap();
        assert_eq!(policy.config["enabled"], json!(true));
        assert_eq!(policy.config["daily_schedule"]["hour"], json!(2));

        assert_eq!(
            document.data[0].data_address(),
            "data.azurerm_aadb2c_directory.tenant"
        );
    }

    #[test]
    fn test_json_document() {
        let document = Document::from_json(
            r#"{"resources": [{"type": "azurerm_x", "name": "a", "config": {"url": "https://example.com"}}]}"#,
        )
        .unwrap();
        assert_eq!(document.resources.len(), 1);
        assert!(document.data.is_empty());
    }

    #[test]
    fn test_duplicate_addresses_rejected() {
        let document = Document::from_yaml(
            "resources:\n  - {type: azurerm_x, name: a}\n  - {type: azurerm_x, name: a}\n",
        )
        .unwrap();
        assert!(document.check().is_err());

        // a data source may share type and name with a resource
        let document = Document::from_yaml(
            "resources:\n  - {type: azurerm_x, name: a}\ndata:\n  - {type: azurerm_x, name: a}\n",
        )
        .unwrap();
        assert!(document.check().is_ok());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("main.yaml");
        std::fs::write(&yaml, YAML).unwrap();
        assert_eq!(Document::load(&yaml).unwrap().resources.len(), 1);

        let json = dir.path().join("main.json");
        std::fs::write(&json, YAML).unwrap();
        assert!(Document::load(&json).is_err());
    }
}
