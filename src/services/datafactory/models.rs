//! Data Factory linked service wire models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LINKED_SERVICE_TYPE_WEB: &str = "Web";

/// A linked service as sent to and returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedServiceResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: LinkedServiceProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceProperties {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_via: Option<IntegrationRuntimeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, ParameterSpecification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
    /// Kind specific; decoded once the kind is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_properties: Option<Value>,
    /// Properties the API does not model
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRuntimeReference {
    pub reference_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpecification {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecureString {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl SecureString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            kind: "SecureString".to_string(),
            value: value.into(),
        }
    }
}

/// `typeProperties` of a web linked service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "authenticationType")]
pub enum WebLinkedServiceTypeProperties {
    Anonymous {
        url: String,
    },
    Basic {
        url: String,
        #[serde(default)]
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<SecureString>,
    },
}

impl WebLinkedServiceTypeProperties {
    pub fn authentication_type(&self) -> &'static str {
        match self {
            WebLinkedServiceTypeProperties::Anonymous { .. } => "Anonymous",
            WebLinkedServiceTypeProperties::Basic { .. } => "Basic",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            WebLinkedServiceTypeProperties::Anonymous { url }
            | WebLinkedServiceTypeProperties::Basic { url, .. } => url,
        }
    }
}

pub fn expand_integration_runtime(name: &str) -> IntegrationRuntimeReference {
    IntegrationRuntimeReference {
        reference_name: name.to_string(),
        kind: "IntegrationRuntimeReference".to_string(),
    }
}

/// Every configured parameter is a string parameter with a default value
pub fn expand_parameters(
    parameters: &BTreeMap<String, String>,
) -> BTreeMap<String, ParameterSpecification> {
    parameters
        .iter()
        .map(|(name, value)| {
            (
                name.clone(),
                ParameterSpecification {
                    kind: "String".to_string(),
                    default_value: Some(Value::String(value.clone())),
                },
            )
        })
        .collect()
}

pub fn flatten_parameters(
    parameters: Option<&BTreeMap<String, ParameterSpecification>>,
) -> BTreeMap<String, String> {
    let Some(parameters) = parameters else {
        return BTreeMap::new();
    };

    parameters
        .iter()
        .map(|(name, spec)| {
            let value = match &spec.default_value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            (name.clone(), value)
        })
        .collect()
}

pub fn expand_annotations(annotations: &[String]) -> Vec<Value> {
    annotations.iter().cloned().map(Value::String).collect()
}

/// Only string annotations are kept
pub fn flatten_annotations(annotations: Option<&Vec<Value>>) -> Vec<String> {
    annotations
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn expand_additional_properties(properties: &BTreeMap<String, String>) -> Map<String, Value> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

pub fn flatten_additional_properties(properties: &Map<String, Value>) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_web_linked_service_decodes() {
        let resource: LinkedServiceResource = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.DataFactory/factories/f/linkedservices/web",
            "name": "web",
            "properties": {
                "type": "Web",
                "description": "test",
                "connectVia": {"referenceName": "ir", "type": "IntegrationRuntimeReference"},
                "parameters": {"env": {"type": "String", "defaultValue": "prod"}},
                "annotations": ["a", 1],
                "typeProperties": {"authenticationType": "Basic", "url": "https://example.com", "username": "u"},
                "foo": "bar"
            }
        }))
        .unwrap();

        let properties = resource.properties;
        assert_eq!(properties.kind, LINKED_SERVICE_TYPE_WEB);
        assert_eq!(properties.connect_via.unwrap().reference_name, "ir");
        assert_eq!(
            flatten_parameters(properties.parameters.as_ref()).get("env").map(String::as_str),
            Some("prod")
        );
        assert_eq!(flatten_annotations(properties.annotations.as_ref()), vec!["a"]);
        assert_eq!(
            flatten_additional_properties(&properties.additional_properties),
            BTreeMap::from([("foo".to_string(), "bar".to_string())])
        );

        let type_properties: WebLinkedServiceTypeProperties =
            serde_json::from_value(properties.type_properties.unwrap()).unwrap();
        assert_eq!(type_properties.authentication_type(), "Basic");
        assert_eq!(type_properties.url(), "https://example.com");
    }

    #[test]
    fn test_basic_authentication_serializes_secure_string() {
        let properties = WebLinkedServiceTypeProperties::Basic {
            url: "https://example.com".to_string(),
            username: "u".to_string(),
            password: Some(SecureString::new("p")),
        };

        assert_eq!(
            serde_json::to_value(properties).unwrap(),
            json!({
                "authenticationType": "Basic",
                "url": "https://example.com",
                "username": "u",
                "password": {"type": "SecureString", "value": "p"}
            })
        );
    }

    #[test]
    fn test_additional_properties_flatten_into_properties() {
        let properties = LinkedServiceProperties {
            kind: LINKED_SERVICE_TYPE_WEB.to_string(),
            description: None,
            connect_via: None,
            parameters: None,
            annotations: None,
            type_properties: None,
            additional_properties: expand_additional_properties(&BTreeMap::from([(
                "foo".to_string(),
                "bar".to_string(),
            )])),
        };

        assert_eq!(
            serde_json::to_value(properties).unwrap(),
            json!({"type": "Web", "foo": "bar"})
        );
    }
}
