//! Operation dispatch
//!
//! Maps a resource type name and an operation onto the registered handler,
//! validating configuration first and bounding every remote call by the
//! resource's timeout.

use super::registry::Registry;
use super::timeouts::with_timeout;
use super::{Attributes, DataSource, Resource};
use crate::azure::client::ArmClient;
use crate::validation::Validation;
use anyhow::{anyhow, Context, Result};

/// Id and attributes of an object after an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    pub id: String,
    pub attributes: Attributes,
}

/// Runs operations against the resources of a [`Registry`]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    client: &'a ArmClient,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, client: &'a ArmClient) -> Self {
        Self { registry, client }
    }

    fn resource(&self, resource_type: &str) -> Result<&'a dyn Resource> {
        self.registry
            .get_resource(resource_type)
            .ok_or_else(|| anyhow!("Unknown resource type: {}", resource_type))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&'a dyn DataSource> {
        self.registry
            .get_data_source(data_source_type)
            .ok_or_else(|| anyhow!("Unknown data source type: {}", data_source_type))
    }

    /// Create an object and read it back
    pub async fn create(&self, resource_type: &str, config: &Attributes) -> Result<ResourceState> {
        let resource = self.resource(resource_type)?;
        ensure_valid(resource_type, self.registry.validate_resource(resource_type, config)?)?;

        let timeouts = resource.timeouts();
        tracing::info!("Creating {}", resource_type);
        let id = with_timeout(
            &format!("creating {}", resource_type),
            timeouts.create,
            resource.create(self.client, config),
        )
        .await?;

        let attributes = with_timeout(
            &format!("reading {} {}", resource_type, id),
            timeouts.read,
            resource.read(self.client, &id, Some(config)),
        )
        .await?
        .ok_or_else(|| anyhow!("{} {} was not found after creation", resource_type, id))?;

        Ok(ResourceState { id, attributes })
    }

    /// Update an object in place and read it back
    pub async fn update(
        &self,
        resource_type: &str,
        id: &str,
        config: &Attributes,
    ) -> Result<ResourceState> {
        let resource = self.resource(resource_type)?;
        ensure_valid(resource_type, self.registry.validate_resource(resource_type, config)?)?;

        let timeouts = resource.timeouts();
        tracing::info!("Updating {} {}", resource_type, id);
        with_timeout(
            &format!("updating {} {}", resource_type, id),
            timeouts.update,
            resource.update(self.client, id, config),
        )
        .await?;

        let attributes = with_timeout(
            &format!("reading {} {}", resource_type, id),
            timeouts.read,
            resource.read(self.client, id, Some(config)),
        )
        .await?
        .ok_or_else(|| anyhow!("{} {} was not found after update", resource_type, id))?;

        Ok(ResourceState {
            id: id.to_string(),
            attributes,
        })
    }

    /// Refresh an object; `None` when it is gone
    pub async fn read(
        &self,
        resource_type: &str,
        id: &str,
        prior: Option<&Attributes>,
    ) -> Result<Option<Attributes>> {
        let resource = self.resource(resource_type)?;
        with_timeout(
            &format!("reading {} {}", resource_type, id),
            resource.timeouts().read,
            resource.read(self.client, id, prior),
        )
        .await
    }

    pub async fn delete(&self, resource_type: &str, id: &str) -> Result<()> {
        let resource = self.resource(resource_type)?;
        tracing::info!("Deleting {} {}", resource_type, id);
        with_timeout(
            &format!("deleting {} {}", resource_type, id),
            resource.timeouts().delete,
            resource.delete(self.client, id),
        )
        .await
    }

    /// Adopt an existing object by id
    pub async fn import(&self, resource_type: &str, id: &str) -> Result<ResourceState> {
        let resource = self.resource(resource_type)?;
        resource
            .validate_import_id(id)
            .with_context(|| format!("importing {}", resource_type))?;

        let attributes = self.read(resource_type, id, None).await?.ok_or_else(|| {
            anyhow!(
                "Cannot import non-existent remote object {} {}",
                resource_type,
                id
            )
        })?;

        Ok(ResourceState {
            id: id.to_string(),
            attributes,
        })
    }

    /// Look up a data source
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: &Attributes,
    ) -> Result<ResourceState> {
        let data_source = self.data_source(data_source_type)?;
        ensure_valid(
            data_source_type,
            self.registry.validate_data_source(data_source_type, config)?,
        )?;

        let (id, attributes) = with_timeout(
            &format!("reading {}", data_source_type),
            data_source.read_timeout(),
            data_source.read(self.client, config),
        )
        .await?;

        Ok(ResourceState { id, attributes })
    }
}

/// Turn a failed validation into an error, logging warnings either way
pub fn ensure_valid(object_type: &str, validation: Validation) -> Result<()> {
    for warning in &validation.warnings {
        tracing::warn!("{}: {}", object_type, warning);
    }

    if validation.is_valid() {
        return Ok(());
    }

    let messages: Vec<String> = validation.errors.iter().map(ToString::to_string).collect();
    Err(anyhow!(
        "invalid configuration for {}:\n  - {}",
        object_type,
        messages.join("\n  - ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_ensure_valid_passes_warnings() {
        let mut validation = Validation::ok();
        validation.push_warning("deprecated");
        assert!(ensure_valid("azurerm_x", validation).is_ok());
    }

    #[test]
    fn test_ensure_valid_lists_errors() {
        let mut validation = Validation::ok();
        validation.push_error(ValidationError::Missing {
            key: "url".to_string(),
        });
        validation.push_error(ValidationError::Unknown {
            key: "bogus".to_string(),
        });

        let message = ensure_valid("azurerm_x", validation).unwrap_err().to_string();
        assert!(message.starts_with("invalid configuration for azurerm_x"));
        assert!(message.contains("\"url\" is required"));
        assert!(message.contains("\"bogus\""));
    }
}
