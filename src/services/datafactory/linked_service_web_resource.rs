//! `azurerm_data_factory_linked_service_web` resource

use super::ids::{DataFactoryId, LinkedServiceId};
use super::models::{
    expand_additional_properties, expand_annotations, expand_integration_runtime,
    expand_parameters, flatten_additional_properties, flatten_annotations, flatten_parameters,
    LinkedServiceProperties, LinkedServiceResource, SecureString, WebLinkedServiceTypeProperties,
    LINKED_SERVICE_TYPE_WEB,
};
use super::validate::{linked_service_dataset_name, web_authentication_type};
use super::API_VERSION;
use crate::azure::client::ArmClient;
use crate::azure::http::response_was_not_found;
use crate::resource::{import_as_exists_error, Attribute, AttributeType, Schema, TypedResource};
use crate::resourceids::ParseError;
use crate::validation::string_is_not_empty;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const RESOURCE_TYPE: &str = "azurerm_data_factory_linked_service_web";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedServiceWebModel {
    pub name: String,
    pub data_factory_id: DataFactoryId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_group_name: String,
    pub authentication_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_runtime_name: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub additional_properties: BTreeMap<String, String>,
}

impl LinkedServiceWebModel {
    fn type_properties(&self) -> WebLinkedServiceTypeProperties {
        match self.authentication_type.as_str() {
            "Basic" => WebLinkedServiceTypeProperties::Basic {
                url: self.url.clone(),
                username: self.username.clone().unwrap_or_default(),
                password: Some(SecureString::new(self.password.clone().unwrap_or_default())),
            },
            _ => WebLinkedServiceTypeProperties::Anonymous {
                url: self.url.clone(),
            },
        }
    }

    fn to_api(&self) -> Result<LinkedServiceResource> {
        let type_properties = serde_json::to_value(self.type_properties())
            .context("encoding web linked service type properties")?;

        Ok(LinkedServiceResource {
            id: None,
            name: None,
            properties: LinkedServiceProperties {
                kind: LINKED_SERVICE_TYPE_WEB.to_string(),
                description: self.description.clone(),
                connect_via: self
                    .integration_runtime_name
                    .as_deref()
                    .map(expand_integration_runtime),
                parameters: (!self.parameters.is_empty())
                    .then(|| expand_parameters(&self.parameters)),
                annotations: (!self.annotations.is_empty())
                    .then(|| expand_annotations(&self.annotations)),
                type_properties: Some(type_properties),
                additional_properties: expand_additional_properties(&self.additional_properties),
            },
        })
    }
}

pub struct LinkedServiceWebResource;

impl LinkedServiceWebResource {
    async fn put(&self, client: &ArmClient, id: &LinkedServiceId, model: &LinkedServiceWebModel) -> Result<()> {
        let body = serde_json::to_value(model.to_api()?)
            .with_context(|| format!("encoding {}", id))?;

        client
            .put(&id.id(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating/updating Data Factory Web {}", id))?;

        Ok(())
    }
}

#[async_trait]
impl TypedResource for LinkedServiceWebResource {
    type Model = LinkedServiceWebModel;

    fn resource_type(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with(
                "name",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(linked_service_dataset_name),
            )
            .with(
                "data_factory_id",
                Attribute::required(AttributeType::String)
                    .force_new()
                    .validate_with(DataFactoryId::validate),
            )
            .with("resource_group_name", Attribute::computed(AttributeType::String))
            .with(
                "authentication_type",
                Attribute::required(AttributeType::String).validate_with(web_authentication_type),
            )
            .with(
                "url",
                Attribute::required(AttributeType::String).validate_with(string_is_not_empty),
            )
            .with(
                "username",
                Attribute::optional(AttributeType::String).validate_with(string_is_not_empty),
            )
            .with(
                "password",
                Attribute::optional(AttributeType::String)
                    .sensitive()
                    .validate_with(string_is_not_empty),
            )
            .with(
                "description",
                Attribute::optional(AttributeType::String).validate_with(string_is_not_empty),
            )
            .with(
                "integration_runtime_name",
                Attribute::optional(AttributeType::String).validate_with(string_is_not_empty),
            )
            .with("parameters", Attribute::optional(AttributeType::Map))
            .with("annotations", Attribute::optional(AttributeType::List))
            .with("additional_properties", Attribute::optional(AttributeType::Map))
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ParseError> {
        LinkedServiceId::parse(id).map(|_| ())
    }

    async fn create(&self, client: &ArmClient, model: Self::Model) -> Result<String> {
        let id = model.data_factory_id.linked_service(model.name.clone());

        tracing::info!("Checking for presence of existing {}", id);
        match client.get(&id.id(), API_VERSION).await {
            Ok(existing) => {
                let existing_id = existing
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|existing_id| !existing_id.is_empty())
                    .map_or_else(|| id.id(), str::to_string);
                return Err(import_as_exists_error(RESOURCE_TYPE, &existing_id));
            }
            Err(err) if response_was_not_found(&err) => {}
            Err(err) => {
                return Err(err.context(format!(
                    "checking for presence of existing Data Factory Web {}",
                    id
                )))
            }
        }

        tracing::info!("Creating {}", id);
        self.put(client, &id, &model).await?;

        Ok(id.id())
    }

    async fn read(
        &self,
        client: &ArmClient,
        id: &str,
        prior: Option<Self::Model>,
    ) -> Result<Option<Self::Model>> {
        let id = LinkedServiceId::parse(id)?;

        tracing::info!("Reading {}", id);
        let response = match client.get(&id.id(), API_VERSION).await {
            Ok(response) => response,
            Err(err) if response_was_not_found(&err) => {
                tracing::info!("{} was not found - removing from state", id);
                return Ok(None);
            }
            Err(err) => return Err(err.context(format!("retrieving Data Factory Web {}", id))),
        };

        let resp: LinkedServiceResource = serde_json::from_value(response)
            .with_context(|| format!("decoding Data Factory Web {}", id))?;
        let web = resp.properties;

        if web.kind != LINKED_SERVICE_TYPE_WEB {
            return Err(anyhow!(
                "classifying Data Factory Web {}: Expected: {:?} Received: {:?}",
                id,
                LINKED_SERVICE_TYPE_WEB,
                web.kind
            ));
        }

        let type_properties: WebLinkedServiceTypeProperties = web
            .type_properties
            .ok_or_else(|| anyhow!("retrieving Data Factory Web {}: missing typeProperties", id))
            .and_then(|value| {
                serde_json::from_value(value)
                    .with_context(|| format!("decoding type properties of {}", id))
            })?;

        let username = match &type_properties {
            WebLinkedServiceTypeProperties::Basic { username, .. } if !username.is_empty() => {
                Some(username.clone())
            }
            _ => None,
        };

        // the API never returns the password
        let password = match type_properties {
            WebLinkedServiceTypeProperties::Basic { .. } => {
                prior.as_ref().and_then(|prior| prior.password.clone())
            }
            WebLinkedServiceTypeProperties::Anonymous { .. } => None,
        };

        Ok(Some(LinkedServiceWebModel {
            name: resp.name.unwrap_or_else(|| id.name.clone()),
            data_factory_id: id.data_factory_id(),
            resource_group_name: id.resource_group.clone(),
            authentication_type: type_properties.authentication_type().to_string(),
            url: type_properties.url().to_string(),
            username,
            password,
            description: web.description,
            integration_runtime_name: web.connect_via.map(|connect_via| connect_via.reference_name),
            parameters: flatten_parameters(web.parameters.as_ref()),
            annotations: flatten_annotations(web.annotations.as_ref()),
            additional_properties: flatten_additional_properties(&web.additional_properties),
        }))
    }

    async fn update(&self, client: &ArmClient, id: &str, model: Self::Model) -> Result<()> {
        let id = LinkedServiceId::parse(id)?;
        tracing::info!("Updating {}", id);
        self.put(client, &id, &model).await
    }

    async fn delete(&self, client: &ArmClient, id: &str) -> Result<()> {
        let id = LinkedServiceId::parse(id)?;

        tracing::info!("Deleting {}", id);
        match client.delete(&id.id(), API_VERSION).await {
            Ok(_) => Ok(()),
            Err(err) if response_was_not_found(&err) => Ok(()),
            Err(err) => Err(err.context(format!("deleting Data Factory Web {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FACTORY: &str = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.DataFactory/factories/factory1";

    fn model(authentication_type: &str) -> LinkedServiceWebModel {
        LinkedServiceWebModel {
            name: "web".to_string(),
            data_factory_id: DataFactoryId::parse(FACTORY).unwrap(),
            resource_group_name: String::new(),
            authentication_type: authentication_type.to_string(),
            url: "https://example.com".to_string(),
            username: Some("user".to_string()),
            password: Some("secret".to_string()),
            description: None,
            integration_runtime_name: Some("ir".to_string()),
            parameters: BTreeMap::new(),
            annotations: vec!["one".to_string()],
            additional_properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_schema_validation() {
        let schema = TypedResource::schema(&LinkedServiceWebResource);

        let valid = json!({
            "name": "web_service",
            "data_factory_id": FACTORY,
            "authentication_type": "Anonymous",
            "url": "https://example.com",
        });
        let validation = schema.validate(valid.as_object().unwrap());
        assert!(validation.is_valid(), "{:?}", validation.errors);

        let invalid = json!({
            "name": "web-service",
            "data_factory_id": FACTORY.to_lowercase(),
            "authentication_type": "Digest",
            "url": "https://example.com",
            "resource_group_name": "rg",
        });
        let validation = schema.validate(invalid.as_object().unwrap());
        assert_eq!(validation.errors.len(), 4, "{:?}", validation.errors);
    }

    #[test]
    fn test_anonymous_request_body() {
        let body = serde_json::to_value(model("Anonymous").to_api().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "properties": {
                    "type": "Web",
                    "connectVia": {"referenceName": "ir", "type": "IntegrationRuntimeReference"},
                    "annotations": ["one"],
                    "typeProperties": {"authenticationType": "Anonymous", "url": "https://example.com"}
                }
            })
        );
    }

    #[test]
    fn test_basic_request_body_carries_password() {
        let body = serde_json::to_value(model("Basic").to_api().unwrap()).unwrap();
        assert_eq!(
            body["properties"]["typeProperties"],
            json!({
                "authenticationType": "Basic",
                "url": "https://example.com",
                "username": "user",
                "password": {"type": "SecureString", "value": "secret"}
            })
        );
    }

    #[test]
    fn test_model_decodes_from_configuration() {
        let decoded: LinkedServiceWebModel = serde_json::from_value(json!({
            "name": "web",
            "data_factory_id": FACTORY,
            "authentication_type": "Anonymous",
            "url": "https://example.com",
        }))
        .unwrap();
        assert_eq!(decoded.data_factory_id.factory_name, "factory1");
        assert!(decoded.parameters.is_empty());

        let bad_parent = serde_json::from_value::<LinkedServiceWebModel>(json!({
            "name": "web",
            "data_factory_id": "/subscriptions/s",
            "authentication_type": "Anonymous",
            "url": "https://example.com",
        }));
        assert!(bad_parent.is_err());
    }

    #[test]
    fn test_import_id_must_be_a_linked_service() {
        let resource = LinkedServiceWebResource;
        assert!(resource
            .validate_import_id(&format!("{}/linkedservices/web", FACTORY))
            .is_ok());
        assert!(resource.validate_import_id(FACTORY).is_err());
    }
}
