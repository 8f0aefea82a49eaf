//! Command implementations
//!
//! Everything the CLI does, minus argument parsing and printing. Commands
//! that talk to the API run through a [`Session`]; the offline ones
//! (`validate`, `schema`, `id ...`) are free functions.

use crate::azure::client::ArmClient;
use crate::document::Document;
use crate::resource::{Attributes, Dispatcher, Registry, ResourceState, Schema};
use crate::resourceids::ParseError;
use crate::services;
use crate::state::{address, StateStore};
use crate::validation::Validation;
use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Placeholder printed instead of sensitive values
pub const SENSITIVE: &str = "(sensitive value)";

/// What `apply` did to one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created { address: String, id: String },
    Updated { address: String, id: String },
    Replaced { address: String, id: String, because: Vec<&'static str> },
    Unchanged { address: String },
    Deleted { address: String, id: String },
    Read { address: String, id: String },
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Created { address, id } => write!(f, "{}: created {}", address, id),
            Change::Updated { address, id } => write!(f, "{}: updated {}", address, id),
            Change::Replaced { address, id, because } => {
                write!(f, "{}: replaced {} (changed: {})", address, id, because.join(", "))
            }
            Change::Unchanged { address } => write!(f, "{}: unchanged", address),
            Change::Deleted { address, id } => write!(f, "{}: deleted {}", address, id),
            Change::Read { address, id } => write!(f, "{}: read {}", address, id),
        }
    }
}

/// What `refresh` found for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refreshed {
    Current { address: String },
    Gone { address: String },
    Failed { address: String, error: String },
}

impl std::fmt::Display for Refreshed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refreshed::Current { address } => write!(f, "{}: refreshed", address),
            Refreshed::Gone { address } => {
                write!(f, "{}: no longer exists, removed from state", address)
            }
            Refreshed::Failed { address, error } => write!(f, "{}: {}", address, error),
        }
    }
}

/// Commands that need the API and the state file
pub struct Session<'a> {
    registry: &'a Registry,
    dispatcher: Dispatcher<'a>,
    pub state: StateStore,
    readonly: bool,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a Registry, client: &'a ArmClient, state: StateStore, readonly: bool) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(registry, client),
            state,
            readonly,
        }
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.readonly {
            bail!("{} is not allowed in read-only mode", operation);
        }
        Ok(())
    }

    /// Bring remote objects in line with a document
    ///
    /// State is saved after every successful step, so a failure part way
    /// through keeps what was already done.
    pub async fn apply(&mut self, document: &Document) -> Result<Vec<Change>> {
        self.ensure_writable("apply")?;

        let mut changes = Vec::new();

        for block in &document.data {
            let address = block.data_address();
            let state = self
                .dispatcher
                .read_data_source(&block.object_type, &block.config)
                .await
                .with_context(|| format!("reading {}", address))?;

            let id = state.id.clone();
            self.state
                .upsert_data_source(address.clone(), &block.object_type, state);
            self.state.save()?;
            changes.push(Change::Read { address, id });
        }

        for block in &document.resources {
            let change = self
                .apply_resource(&block.object_type, &block.address(), &block.config)
                .await
                .with_context(|| format!("applying {}", block.address()))?;
            self.state.save()?;
            changes.push(change);
        }

        let orphans: Vec<(String, String, String)> = self
            .state
            .resources()
            .filter(|(address, _)| document.resource(address).is_none())
            .map(|(address, record)| (address.clone(), record.resource_type.clone(), record.id.clone()))
            .collect();

        for (address, resource_type, id) in orphans {
            self.dispatcher
                .delete(&resource_type, &id)
                .await
                .with_context(|| format!("deleting {}", address))?;
            self.state.remove(&address);
            self.state.save()?;
            changes.push(Change::Deleted { address, id });
        }

        // reads of data blocks no longer declared are only forgotten
        let stale: Vec<String> = self
            .state
            .data_sources()
            .filter(|(address, _)| document.data_source(address).is_none())
            .map(|(address, _)| address.clone())
            .collect();
        if !stale.is_empty() {
            for address in &stale {
                tracing::info!("Forgetting {}", address);
                self.state.remove(address);
            }
            self.state.save()?;
        }

        Ok(changes)
    }

    async fn apply_resource(
        &mut self,
        resource_type: &str,
        address: &str,
        config: &Attributes,
    ) -> Result<Change> {
        let schema = self
            .registry
            .schema(resource_type)
            .ok_or_else(|| anyhow!("Unknown resource type: {}", resource_type))?;

        let prior = self
            .state
            .get(address)
            .filter(|record| record.resource_type == resource_type)
            .map(|record| (record.id.clone(), record.attributes.clone()));

        let Some((id, attributes)) = prior else {
            let state = self.dispatcher.create(resource_type, config).await?;
            let id = state.id.clone();
            self.state.upsert(address.to_string(), resource_type, state);
            return Ok(Change::Created {
                address: address.to_string(),
                id,
            });
        };

        let because = schema.replacing_changes(&attributes, config);
        if !because.is_empty() {
            tracing::info!("Replacing {} because of {:?}", address, because);
            self.dispatcher.delete(resource_type, &id).await?;
            self.state.remove(address);
            self.state.save()?;

            let state = self.dispatcher.create(resource_type, config).await?;
            let id = state.id.clone();
            self.state.upsert(address.to_string(), resource_type, state);
            return Ok(Change::Replaced {
                address: address.to_string(),
                id,
                because,
            });
        }

        if is_unchanged(&schema, &attributes, config) {
            return Ok(Change::Unchanged {
                address: address.to_string(),
            });
        }

        let state = self.dispatcher.update(resource_type, &id, config).await?;
        self.state.upsert(address.to_string(), resource_type, state);
        Ok(Change::Updated {
            address: address.to_string(),
            id,
        })
    }

    /// Re-read every recorded resource concurrently
    pub async fn refresh(&mut self) -> Result<Vec<Refreshed>> {
        let records: Vec<(String, String, String, Attributes)> = self
            .state
            .resources()
            .map(|(address, record)| {
                (
                    address.clone(),
                    record.resource_type.clone(),
                    record.id.clone(),
                    record.attributes.clone(),
                )
            })
            .collect();

        let dispatcher = &self.dispatcher;
        let reads = records.iter().map(|(_, resource_type, id, attributes)| {
            dispatcher.read(resource_type, id, Some(attributes))
        });
        let results = join_all(reads).await;

        let mut outcomes = Vec::with_capacity(records.len());
        for ((address, resource_type, id, _), result) in records.into_iter().zip(results) {
            match result {
                Ok(Some(attributes)) => {
                    self.state
                        .upsert(address.clone(), &resource_type, ResourceState { id, attributes });
                    outcomes.push(Refreshed::Current { address });
                }
                Ok(None) => {
                    self.state.remove(&address);
                    outcomes.push(Refreshed::Gone { address });
                }
                Err(e) => {
                    tracing::error!("Failed to refresh {}: {:#}", address, e);
                    outcomes.push(Refreshed::Failed {
                        address,
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        self.state.save()?;
        Ok(outcomes)
    }

    /// Delete one recorded resource, or all of them
    pub async fn destroy(&mut self, only: Option<&str>) -> Result<Vec<Change>> {
        self.ensure_writable("destroy")?;

        let targets: Vec<(String, String, String)> = self
            .state
            .resources()
            .filter(|(address, _)| only.map_or(true, |only| only == address.as_str()))
            .map(|(address, record)| (address.clone(), record.resource_type.clone(), record.id.clone()))
            .collect();

        if let Some(only) = only {
            if targets.is_empty() {
                bail!("{} is not in the state", only);
            }
        }

        let mut changes = Vec::with_capacity(targets.len());
        for (address, resource_type, id) in targets {
            self.dispatcher
                .delete(&resource_type, &id)
                .await
                .with_context(|| format!("deleting {}", address))?;
            self.state.remove(&address);
            self.state.save()?;
            changes.push(Change::Deleted { address, id });
        }

        Ok(changes)
    }

    /// Adopt an existing remote object under `{resource_type}.{name}`
    pub async fn import(&mut self, resource_type: &str, name: &str, id: &str) -> Result<String> {
        let address = address(resource_type, name);
        if self.state.get(&address).is_some() {
            bail!("{} is already managed; remove it from the state first", address);
        }

        let state = self.dispatcher.import(resource_type, id).await?;
        self.state.upsert(address.clone(), resource_type, state);
        self.state.save()?;
        Ok(address)
    }
}

/// Recorded attributes of an object with sensitive values masked
pub fn read(registry: &Registry, state: &StateStore, address: &str) -> Result<Value> {
    let record = state
        .get(address)
        .ok_or_else(|| anyhow!("{} is not in the state", address))?;

    let attributes = match registry.schema(&record.resource_type) {
        Some(schema) => mask_sensitive(&schema, &record.attributes),
        None => record.attributes.clone(),
    };

    Ok(json!({
        "address": address,
        "type": record.resource_type,
        "id": record.id,
        "updated_at": record.updated_at.to_rfc3339(),
        "attributes": attributes,
    }))
}

/// No configured value differs from state, and nothing set before was unset
fn is_unchanged(schema: &Schema, prior: &Attributes, config: &Attributes) -> bool {
    schema
        .iter()
        .filter(|(_, attr)| attr.is_configurable())
        .all(|(name, _)| {
            match config.get(name).filter(|value| !value.is_null()) {
                Some(value) => prior.get(name) == Some(value),
                None => prior.get(name).map_or(true, is_empty_value),
            }
        })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

pub fn mask_sensitive(schema: &Schema, attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .map(|(key, value)| {
            if schema.is_sensitive(key) && !value.is_null() {
                (key.clone(), Value::String(SENSITIVE.to_string()))
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// Validate every block of a document without contacting the API
pub fn validate_document(registry: &Registry, document: &Document) -> Vec<(String, Validation)> {
    let resources = document.resources.iter().map(|block| {
        let validation = registry
            .validate_resource(&block.object_type, &block.config)
            .unwrap_or_else(|e| unknown_type(&block.object_type, e));
        (block.address(), validation)
    });

    let data = document.data.iter().map(|block| {
        let validation = registry
            .validate_data_source(&block.object_type, &block.config)
            .unwrap_or_else(|e| unknown_type(&block.object_type, e));
        (block.data_address(), validation)
    });

    resources.chain(data).collect()
}

fn unknown_type(object_type: &str, error: anyhow::Error) -> Validation {
    Validation::error(crate::validation::ValidationError::invalid(
        object_type,
        error.to_string(),
    ))
}

/// JSON description of a resource or data source schema
pub fn schema(registry: &Registry, object_type: &str) -> Result<Value> {
    let schema = registry.schema(object_type).ok_or_else(|| {
        anyhow!(
            "Unknown type {:?}. Resources: {:?}. Data sources: {:?}",
            object_type,
            registry.resource_types(),
            registry.data_source_types()
        )
    })?;

    Ok(json!({
        "type": object_type,
        "attributes": schema.describe(),
    }))
}

fn id_type(name: &str) -> Result<crate::resourceids::IdType> {
    services::id_type(name).ok_or_else(|| {
        let known: Vec<_> = services::id_types().iter().map(|t| t.name).collect();
        anyhow!("Unknown id type {:?}, expected one of {:?}", name, known)
    })
}

/// Parse `input`, returning the canonical path and the variable segments
pub fn id_parse(type_name: &str, input: &str, insensitively: bool) -> Result<Value> {
    let id_type = id_type(type_name)?;
    let parsed = id_type.parser().parse(input, insensitively)?;

    let segments: BTreeMap<&str, &str> = id_type
        .variable_segments()
        .filter_map(|segment| parsed.get(segment.name).map(|value| (segment.name, value)))
        .collect();
    let canonical = id_type.format(|name| parsed.get(name).map(str::to_string))?;

    Ok(json!({
        "type": id_type.description,
        "id": canonical,
        "segments": segments,
    }))
}

/// Case-sensitive check of `input`, as configuration validation does it
pub fn id_validate(type_name: &str, input: &str) -> Result<Result<(), ParseError>> {
    let id_type = id_type(type_name)?;
    Ok(id_type.parser().parse(input, false).map(|_| ()))
}

/// Build a canonical path from `segment=value` pairs
pub fn id_format(type_name: &str, values: &[(String, String)]) -> Result<String> {
    let id_type = id_type(type_name)?;

    for (name, _) in values {
        if !id_type.variable_segments().any(|segment| segment.name == name.as_str()) {
            let expected: Vec<_> = id_type.variable_segments().map(|s| s.name).collect();
            bail!("{:?} is not a segment of {}, expected {:?}", name, id_type.name, expected);
        }
    }

    let values: BTreeMap<&str, &str> = values
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();

    Ok(id_type.format(|name| values.get(name).map(|value| value.to_string()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Attribute, AttributeType};

    const POLICY: &str = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.NetApp/netAppAccounts/account1/snapshotPolicies/snapshotpolicy1";

    fn attributes(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_is_unchanged() {
        let schema = Schema::new()
            .with("name", Attribute::required(AttributeType::String))
            .with("tags", Attribute::optional(AttributeType::Map))
            .with("tenant_id", Attribute::computed(AttributeType::String));

        let prior = attributes(json!({"name": "a", "tags": {}, "tenant_id": "t"}));
        assert!(is_unchanged(&schema, &prior, &attributes(json!({"name": "a"}))));
        assert!(!is_unchanged(&schema, &prior, &attributes(json!({"name": "b"}))));
        assert!(!is_unchanged(
            &schema,
            &prior,
            &attributes(json!({"name": "a", "tags": {"env": "prod"}}))
        ));

        let tagged = attributes(json!({"name": "a", "tags": {"env": "prod"}}));
        assert!(!is_unchanged(&schema, &tagged, &attributes(json!({"name": "a"}))));
    }

    #[test]
    fn test_mask_sensitive() {
        let schema = Schema::new()
            .with("url", Attribute::required(AttributeType::String))
            .with("password", Attribute::optional(AttributeType::String).sensitive());

        let masked = mask_sensitive(
            &schema,
            &attributes(json!({"url": "https://example.com", "password": "secret"})),
        );
        assert_eq!(masked["password"], json!(SENSITIVE));
        assert_eq!(masked["url"], json!("https://example.com"));
    }

    #[test]
    fn test_read_masks_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = StateStore::load(dir.path().join("state.json")).unwrap();
        state.upsert(
            "azurerm_data_factory_linked_service_web.web".to_string(),
            "azurerm_data_factory_linked_service_web",
            ResourceState {
                id: "/subscriptions/s/linkedservices/web".to_string(),
                attributes: attributes(json!({"url": "https://example.com", "password": "secret"})),
            },
        );

        let registry = Registry::new();
        let shown = read(&registry, &state, "azurerm_data_factory_linked_service_web.web").unwrap();
        assert_eq!(shown["attributes"]["password"], json!(SENSITIVE));
        assert_eq!(shown["id"], json!("/subscriptions/s/linkedservices/web"));
        assert!(read(&registry, &state, "azurerm_x.missing").is_err());
    }

    #[test]
    fn test_validate_document() {
        let registry = Registry::new();
        let document = Document::from_yaml(
            r#"
resources:
  - type: azurerm_data_factory_linked_service_web
    name: web
    config:
      name: web_service
      data_factory_id: /subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.DataFactory/factories/factory1
      authentication_type: Anonymous
      url: https://example.com
  - type: azurerm_unknown
    name: x
data:
  - type: azurerm_aadb2c_directory
    name: tenant
    config:
      domain_name: contoso.onmicrosoft.com
"#,
        )
        .unwrap();

        let results = validate_document(&registry, &document);
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_valid(), "{:?}", results[0].1.errors);
        assert!(!results[1].1.is_valid());
        assert_eq!(results[2].0, "data.azurerm_aadb2c_directory.tenant");
        assert!(!results[2].1.is_valid());
    }

    #[test]
    fn test_schema_command() {
        let registry = Registry::new();
        let description = schema(&registry, "azurerm_netapp_snapshot_policy").unwrap();
        assert_eq!(description["attributes"]["location"]["force_new"], json!(true));
        assert!(schema(&registry, "azurerm_unknown").is_err());
    }

    #[test]
    fn test_id_parse_command() {
        let parsed = id_parse("netapp-snapshot-policy", POLICY, false).unwrap();
        assert_eq!(parsed["id"], json!(POLICY));
        assert_eq!(parsed["segments"]["snapshotPolicyName"], json!("snapshotpolicy1"));
        assert!(parsed["segments"].get("staticProviders").is_none());

        let upper = POLICY.to_uppercase();
        assert!(id_parse("netapp-snapshot-policy", &upper, false).is_err());
        let parsed = id_parse("netapp-snapshot-policy", &upper, true).unwrap();
        assert_eq!(parsed["segments"]["netAppAccountName"], json!("ACCOUNT1"));

        assert!(id_parse("nope", POLICY, false).is_err());
    }

    #[test]
    fn test_id_validate_command() {
        assert!(id_validate("netapp-snapshot-policy", POLICY).unwrap().is_ok());
        assert!(id_validate("netapp-snapshot-policy", &POLICY.to_uppercase())
            .unwrap()
            .is_err());
    }

    #[test]
    fn test_id_format_command() {
        let values = vec![
            ("subscriptionId".to_string(), "12345678-1234-9876-4563-123456789012".to_string()),
            ("resourceGroup".to_string(), "resGroup1".to_string()),
            ("netAppAccountName".to_string(), "account1".to_string()),
            ("snapshotPolicyName".to_string(), "snapshotpolicy1".to_string()),
        ];
        assert_eq!(id_format("netapp-snapshot-policy", &values).unwrap(), POLICY);

        assert!(id_format("netapp-snapshot-policy", &values[..3]).is_err());

        let mut bogus = values.clone();
        bogus.push(("zone".to_string(), "x".to_string()));
        assert!(id_format("netapp-snapshot-policy", &bogus).is_err());
    }

    #[test]
    fn test_change_display() {
        let change = Change::Replaced {
            address: "azurerm_x.a".to_string(),
            id: "/x".to_string(),
            because: vec!["name", "location"],
        };
        assert_eq!(change.to_string(), "azurerm_x.a: replaced /x (changed: name, location)");
    }
}
