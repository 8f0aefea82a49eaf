//! `azurerm_aadb2c_directory` data source

use super::ids::B2cDirectoryId;
use super::API_VERSION;
use crate::azure::client::ArmClient;
use crate::azure::http::response_was_not_found;
use crate::resource::{Attribute, AttributeType, Schema, TypedDataSource};
use crate::validation::{resource_group_name, string_is_not_empty};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AadB2cDirectoryDataSourceModel {
    pub domain_name: String,
    pub resource_group_name: String,
    #[serde(default)]
    pub billing_type: String,
    #[serde(default)]
    pub data_residency_location: String,
    #[serde(default)]
    pub effective_start_date: String,
    #[serde(default)]
    pub sku_name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub tenant_id: String,
}

/// Tenant as returned by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct B2cTenant {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    sku: Option<Sku>,
    #[serde(default)]
    tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    properties: Option<B2cTenantProperties>,
}

#[derive(Debug, Deserialize)]
struct Sku {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct B2cTenantProperties {
    #[serde(default)]
    billing_config: Option<BillingConfig>,
    #[serde(default)]
    tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingConfig {
    #[serde(default)]
    billing_type: Option<String>,
    #[serde(default)]
    effective_start_date_utc: Option<String>,
}

pub struct AadB2cDirectoryDataSource;

#[async_trait]
impl TypedDataSource for AadB2cDirectoryDataSource {
    type Model = AadB2cDirectoryDataSourceModel;

    fn data_source_type(&self) -> &'static str {
        "azurerm_aadb2c_directory"
    }

    fn arguments(&self) -> Schema {
        Schema::new()
            .with(
                "domain_name",
                Attribute::required(AttributeType::String).validate_with(string_is_not_empty),
            )
            .with(
                "resource_group_name",
                Attribute::required(AttributeType::String).validate_with(resource_group_name),
            )
    }

    fn attributes(&self) -> Schema {
        Schema::new()
            .with("billing_type", Attribute::computed(AttributeType::String))
            .with("data_residency_location", Attribute::computed(AttributeType::String))
            .with("effective_start_date", Attribute::computed(AttributeType::String))
            .with("tenant_id", Attribute::computed(AttributeType::String))
            .with("sku_name", Attribute::computed(AttributeType::String))
            .with("tags", Attribute::computed(AttributeType::Map))
    }

    async fn read(
        &self,
        client: &ArmClient,
        mut state: Self::Model,
    ) -> Result<(String, Self::Model)> {
        let id = B2cDirectoryId::new(
            client.subscription_id.clone(),
            state.resource_group_name.clone(),
            state.domain_name.clone(),
        );

        tracing::info!("Reading {}", id);
        let response = match client.get(&id.id(), API_VERSION).await {
            Ok(response) => response,
            Err(err) if response_was_not_found(&err) => {
                return Err(anyhow!("{} was not found", id));
            }
            Err(err) => return Err(err.context(format!("retrieving {}", id))),
        };

        if response.is_null() {
            return Err(anyhow!("retrieving {}: model was nil", id));
        }

        let model: B2cTenant = serde_json::from_value(response)
            .with_context(|| format!("decoding response for {}", id))?;

        state.domain_name = id.directory_name.clone();
        state.resource_group_name = id.resource_group.clone();

        if let Some(location) = model.location {
            state.data_residency_location = location;
        }

        if let Some(sku) = model.sku {
            state.sku_name = sku.name;
        }

        if let Some(tags) = model.tags {
            state.tags = tags;
        }

        if let Some(properties) = model.properties {
            if let Some(billing_config) = properties.billing_config {
                if let Some(billing_type) = billing_config.billing_type {
                    state.billing_type = billing_type;
                }
                if let Some(effective_start_date) = billing_config.effective_start_date_utc {
                    state.effective_start_date = effective_start_date;
                }
            }

            if let Some(tenant_id) = properties.tenant_id {
                state.tenant_id = tenant_id;
            }
        }

        Ok((id.id(), state))
    }
}
