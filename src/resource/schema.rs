//! Attribute schemas
//!
//! A [`Schema`] describes the flat key/value configuration of one resource or
//! data source. Schemas are plain values built by each resource on demand;
//! there is no global table of them.

use crate::validation::{ValidateFn, Validation, ValidationError};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// List of strings
    List,
    /// Map of string to string
    Map,
    /// Nested object, checked by the attribute's validator
    Object,
}

impl AttributeType {
    fn expected(self) -> &'static str {
        match self {
            AttributeType::String => "a string",
            AttributeType::Bool => "a boolean",
            AttributeType::Int => "an integer",
            AttributeType::List => "a list of strings",
            AttributeType::Map => "a map of strings",
            AttributeType::Object => "an object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Int => value.is_i64() || value.is_u64(),
            AttributeType::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            AttributeType::Map => value
                .as_object()
                .is_some_and(|entries| entries.values().all(Value::is_string)),
            AttributeType::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int => "int",
            AttributeType::List => "list",
            AttributeType::Map => "map",
            AttributeType::Object => "object",
        }
    }
}

/// Declaration of one attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value replaces the remote object
    pub force_new: bool,
    /// Never printed
    pub sensitive: bool,
    pub deprecated: Option<&'static str>,
    pub validate: Option<ValidateFn>,
}

impl Attribute {
    fn base(kind: AttributeType) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            deprecated: None,
            validate: None,
        }
    }

    pub fn required(kind: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::base(kind)
        }
    }

    pub fn optional(kind: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::base(kind)
        }
    }

    /// Set by the provider only
    pub fn computed(kind: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::base(kind)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }

    pub fn validate_with(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Whether users may set this attribute
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }
}

/// Ordered set of named attributes
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    /// Add every attribute of `other`
    pub fn merge(mut self, other: Schema) -> Self {
        self.attributes.extend(other.attributes);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (*name, attr))
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.get(name).is_some_and(|attr| attr.sensitive)
    }

    /// Names of force-new attributes whose value differs between two states
    pub fn replacing_changes(&self, prior: &Map<String, Value>, config: &Map<String, Value>) -> Vec<&'static str> {
        self.iter()
            .filter(|(_, attr)| attr.force_new)
            .filter(|(name, _)| {
                let before = prior.get(*name).unwrap_or(&Value::Null);
                let after = config.get(*name).unwrap_or(&Value::Null);
                before != after
            })
            .map(|(name, _)| name)
            .collect()
    }

    /// Check a raw configuration object against this schema
    ///
    /// Null values count as unset.
    pub fn validate(&self, config: &Map<String, Value>) -> Validation {
        let mut validation = Validation::ok();

        for (key, value) in config {
            if value.is_null() {
                continue;
            }

            let Some(attr) = self.get(key) else {
                validation.push_error(ValidationError::Unknown { key: key.clone() });
                continue;
            };

            if !attr.is_configurable() {
                validation.push_error(ValidationError::Computed { key: key.clone() });
                continue;
            }

            if !attr.kind.matches(value) {
                validation.push_error(ValidationError::WrongType {
                    key: key.clone(),
                    expected: attr.kind.expected(),
                });
                continue;
            }

            if let Some(message) = attr.deprecated {
                validation.push_warning(format!("{key:?} is deprecated: {message}"));
            }

            if let Some(validate) = attr.validate {
                validation.merge(validate(value, key));
            }
        }

        for (name, attr) in self.iter() {
            if attr.required && config.get(name).map_or(true, Value::is_null) {
                validation.push_error(ValidationError::Missing {
                    key: name.to_string(),
                });
            }
        }

        validation
    }

    /// JSON description used by the `schema` command
    pub fn describe(&self) -> Value {
        let attributes: Map<String, Value> = self
            .iter()
            .map(|(name, attr)| {
                let mut description = json!({
                    "type": attr.kind.name(),
                    "required": attr.required,
                    "optional": attr.optional,
                    "computed": attr.computed,
                });
                if attr.force_new {
                    description["force_new"] = json!(true);
                }
                if attr.sensitive {
                    description["sensitive"] = json!(true);
                }
                if let Some(message) = attr.deprecated {
                    description["deprecated"] = json!(message);
                }
                (name.to_string(), description)
            })
            .collect();

        Value::Object(attributes)
    }
}
