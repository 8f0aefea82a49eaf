//! Configuration value validation
//!
//! Every validator shares one signature: it receives the raw (untyped) value
//! found under `key` in a configuration object and returns the warnings and
//! errors it produced. Validators never panic on a type mismatch; a value of
//! the wrong type is itself reported as an error.

use crate::resourceids::ParseError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Signature shared by every attribute validator
pub type ValidateFn = fn(&Value, &str) -> Validation;

/// Errors reported while validating configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value has the wrong type.
    #[error("expected {key:?} to be {expected}")]
    WrongType { key: String, expected: &'static str },

    /// The value could not be parsed as a resource id.
    #[error(transparent)]
    InvalidId(#[from] ParseError),

    /// The value has the right type but an unacceptable content.
    #[error("{message}")]
    Invalid { key: String, message: String },

    /// A required attribute is missing.
    #[error("the attribute {key:?} is required")]
    Missing { key: String },

    /// The attribute is not part of the schema.
    #[error("an attribute named {key:?} is not expected here")]
    Unknown { key: String },

    /// The attribute is computed by the provider and cannot be configured.
    #[error("the attribute {key:?} is computed and cannot be set")]
    Computed { key: String },
}

impl ValidationError {
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one value (or a whole configuration object)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validation {
    pub warnings: Vec<String>,
    pub errors: Vec<ValidationError>,
}

impl Validation {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn error(error: ValidationError) -> Self {
        Self {
            warnings: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Append the findings of another validation
    pub fn merge(&mut self, other: Validation) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}

/// Borrow `value` as a string or produce the type-mismatch validation
pub fn expect_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, Validation> {
    value.as_str().ok_or_else(|| {
        Validation::error(ValidationError::WrongType {
            key: key.to_string(),
            expected: "a string",
        })
    })
}

/// Value must be a non-empty string
pub fn string_is_not_empty(value: &Value, key: &str) -> Validation {
    let v = match expect_str(value, key) {
        Ok(v) => v,
        Err(validation) => return validation,
    };

    if v.trim().is_empty() {
        return Validation::error(ValidationError::invalid(
            key,
            format!("{key:?} must not be empty"),
        ));
    }

    Validation::ok()
}

static RESOURCE_GROUP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\w._()]+$").expect("resource group regex is valid"));

/// Value must be a legal resource group name
///
/// Resource group names are 1 to 90 characters of letters, digits,
/// underscores, hyphens, periods and parentheses, and cannot end in a period.
pub fn resource_group_name(value: &Value, key: &str) -> Validation {
    let v = match expect_str(value, key) {
        Ok(v) => v,
        Err(validation) => return validation,
    };

    let mut validation = Validation::ok();

    if v.is_empty() || v.chars().count() > 90 {
        validation.push_error(ValidationError::invalid(
            key,
            format!("{key:?} must be between 1 and 90 characters in length"),
        ));
    }

    if !v.is_empty() && !RESOURCE_GROUP_NAME_RE.is_match(v) {
        validation.push_error(ValidationError::invalid(
            key,
            format!(
                "{key:?} may only contain alphanumeric characters, dash, underscores, parentheses and periods"
            ),
        ));
    }

    if v.ends_with('.') {
        validation.push_error(ValidationError::invalid(
            key,
            format!("{key:?} cannot end with a period"),
        ));
    }

    validation
}

/// Azure region in the form the API reports it: lower case, no spaces
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_is_not_empty() {
        assert!(string_is_not_empty(&json!("value"), "k").is_valid());
        assert!(!string_is_not_empty(&json!(""), "k").is_valid());
        assert!(!string_is_not_empty(&json!("   "), "k").is_valid());
    }

    #[test]
    fn test_non_string_is_a_single_type_error() {
        let validation = string_is_not_empty(&json!(42), "name");
        assert!(validation.warnings.is_empty());
        assert_eq!(
            validation.errors,
            vec![ValidationError::WrongType {
                key: "name".to_string(),
                expected: "a string",
            }]
        );
    }

    #[test]
    fn test_resource_group_name() {
        for valid in ["resGroup1", "my-rg_(prod).eu", "a"] {
            assert!(
                resource_group_name(&json!(valid), "resource_group_name").is_valid(),
                "{valid} should be valid"
            );
        }

        for invalid in ["", "ends.", "has space", "has/slash"] {
            assert!(
                !resource_group_name(&json!(invalid), "resource_group_name").is_valid(),
                "{invalid} should be invalid"
            );
        }

        let too_long = "a".repeat(91);
        assert!(!resource_group_name(&json!(too_long), "resource_group_name").is_valid());
    }

    #[test]
    fn test_merge_keeps_everything() {
        let mut a = Validation::ok();
        a.push_warning("deprecated");
        let b = Validation::error(ValidationError::Missing {
            key: "url".to_string(),
        });

        a.merge(b);
        assert_eq!(a.warnings.len(), 1);
        assert_eq!(a.errors.len(), 1);
        assert!(!a.is_valid());
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("westeurope"), "westeurope");
    }
}
