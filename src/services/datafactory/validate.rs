//! Data Factory name validators

use crate::validation::{expect_str, Validation, ValidationError};
use serde_json::Value;

/// Characters a linked service or dataset name may not contain
const LINKED_SERVICE_FORBIDDEN: &[char] = &['-', '.', '+', '?', '/', '<', '>', '*', '%', '&', ':', '\\'];

/// Authentication types supported by web linked services
pub const WEB_AUTHENTICATION_TYPES: &[&str] = &["Anonymous", "Basic"];

/// Linked service and dataset names
pub fn linked_service_dataset_name(value: &Value, key: &str) -> Validation {
    let v = match expect_str(value, key) {
        Ok(v) => v,
        Err(validation) => return validation,
    };

    let mut validation = Validation::ok();

    if v.is_empty() {
        validation.push_error(ValidationError::invalid(key, format!("{key:?} must not be empty")));
    }

    if v.contains(LINKED_SERVICE_FORBIDDEN) {
        validation.push_error(ValidationError::invalid(
            key,
            format!(
                "any of '-' '.', '+', '?', '/', '<', '>', '*', '%', '&', ':', '\\', are not allowed in {key:?}: {v:?}"
            ),
        ));
    }

    if v.chars().count() > 260 {
        validation.push_error(ValidationError::invalid(
            key,
            format!("{key:?} can be at most 260 characters long"),
        ));
    }

    validation
}

/// One of [`WEB_AUTHENTICATION_TYPES`]
pub fn web_authentication_type(value: &Value, key: &str) -> Validation {
    let v = match expect_str(value, key) {
        Ok(v) => v,
        Err(validation) => return validation,
    };

    if !WEB_AUTHENTICATION_TYPES.contains(&v) {
        return Validation::error(ValidationError::invalid(
            key,
            format!(
                "expected {key} to be one of {:?}, got {v:?}",
                WEB_AUTHENTICATION_TYPES
            ),
        ));
    }

    Validation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_linked_service_dataset_name() {
        assert!(linked_service_dataset_name(&json!("web_linked_service"), "name").is_valid());

        for invalid in ["has-dash", "a.b", "x:y", "back\\slash", ""] {
            assert!(
                !linked_service_dataset_name(&json!(invalid), "name").is_valid(),
                "{invalid}"
            );
        }

        assert!(!linked_service_dataset_name(&json!("a".repeat(261)), "name").is_valid());
    }

    #[test]
    fn test_web_authentication_type() {
        assert!(web_authentication_type(&json!("Anonymous"), "authentication_type").is_valid());
        assert!(web_authentication_type(&json!("Basic"), "authentication_type").is_valid());
        assert!(!web_authentication_type(&json!("basic"), "authentication_type").is_valid());
        assert_eq!(
            web_authentication_type(&json!(true), "authentication_type").errors.len(),
            1
        );
    }
}
