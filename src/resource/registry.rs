//! Resource Registry
//!
//! Holds every resource and data source the provider exposes. A `Registry`
//! is built once at startup and passed by reference to whatever needs it.

use super::schema::Schema;
use super::{Attributes, DataSource, Resource};
use crate::services;
use crate::validation::Validation;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;

/// Resources and data sources keyed by type name
#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Registry {
    /// Registry with every service of the provider
    pub fn new() -> Self {
        let mut registry = Self::empty();
        services::register_all(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_resource(&mut self, resource: impl Resource + 'static) {
        self.resources
            .insert(resource.resource_type(), Box::new(resource));
    }

    pub fn register_data_source(&mut self, data_source: impl DataSource + 'static) {
        self.data_sources
            .insert(data_source.data_source_type(), Box::new(data_source));
    }

    /// Get a resource by type name
    pub fn get_resource(&self, resource_type: &str) -> Option<&dyn Resource> {
        self.resources.get(resource_type).map(|r| r.as_ref())
    }

    /// Get a data source by type name
    pub fn get_data_source(&self, data_source_type: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(data_source_type).map(|d| d.as_ref())
    }

    /// All resource type names, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// All data source type names, sorted
    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    /// Schema of a resource or, failing that, a data source
    pub fn schema(&self, object_type: &str) -> Option<Schema> {
        self.get_resource(object_type)
            .map(|r| r.schema())
            .or_else(|| self.get_data_source(object_type).map(|d| d.schema()))
    }

    pub fn validate_resource(&self, resource_type: &str, config: &Attributes) -> Result<Validation> {
        let resource = self
            .get_resource(resource_type)
            .ok_or_else(|| anyhow!("Unknown resource type: {}", resource_type))?;
        Ok(resource.schema().validate(config))
    }

    pub fn validate_data_source(
        &self,
        data_source_type: &str,
        config: &Attributes,
    ) -> Result<Validation> {
        let data_source = self
            .get_data_source(data_source_type)
            .ok_or_else(|| anyhow!("Unknown data source type: {}", data_source_type))?;
        Ok(data_source.schema().validate(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_loads_successfully() {
        let registry = Registry::new();
        assert!(
            !registry.resource_types().is_empty(),
            "Registry should have resources"
        );
        assert!(
            !registry.data_source_types().is_empty(),
            "Registry should have data sources"
        );
    }

    #[test]
    fn test_linked_service_web_resource_exists() {
        let registry = Registry::new();
        let resource = registry.get_resource("azurerm_data_factory_linked_service_web");
        assert!(resource.is_some(), "Linked service web resource should exist");

        let timeouts = resource.unwrap().timeouts();
        assert_eq!(timeouts.read.as_secs(), 300);
        assert_eq!(timeouts.create.as_secs(), 1800);
    }

    #[test]
    fn test_get_all_types() {
        let registry = Registry::new();
        assert_eq!(
            registry.resource_types(),
            vec![
                "azurerm_data_factory_linked_service_web",
                "azurerm_netapp_snapshot_policy"
            ]
        );
        assert_eq!(registry.data_source_types(), vec!["azurerm_aadb2c_directory"]);
    }

    #[test]
    fn test_schema_lookup_covers_data_sources() {
        let registry = Registry::new();
        let schema = registry.schema("azurerm_aadb2c_directory").unwrap();
        assert!(schema.get("tenant_id").is_some_and(|a| a.computed));
        assert!(schema.get("domain_name").is_some_and(|a| a.required));
        assert!(registry.schema("azurerm_nope").is_none());
    }

    #[test]
    fn test_validate_unknown_type() {
        let registry = Registry::new();
        let config = json!({}).as_object().cloned().unwrap();
        assert!(registry.validate_resource("azurerm_nope", &config).is_err());
        assert!(registry.validate_data_source("azurerm_nope", &config).is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::empty();
        assert!(registry.resource_types().is_empty());
        assert!(registry.get_resource("azurerm_netapp_snapshot_policy").is_none());
    }
}
