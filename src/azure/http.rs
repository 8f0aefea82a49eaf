//! HTTP utilities for Azure Resource Manager REST calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const USER_AGENT: &str = concat!("azrm/", env!("CARGO_PKG_VERSION"));

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A non-success response from the Resource Manager API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("API request failed: {status} ({code}): {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Build from a status and the (possibly empty) ARM error body
    fn from_response(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Detail,
        }

        #[derive(Deserialize)]
        struct Detail {
            #[serde(default)]
            code: String,
            #[serde(default)]
            message: String,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => Self {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => Self {
                status,
                code: "Unknown".to_string(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            },
        }
    }
}

/// Whether `error` is (or wraps) a 404 from the API
pub fn response_was_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ApiError>()
        .is_some_and(ApiError::is_not_found)
}

/// HTTP client wrapper for Resource Manager calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url).bearer_auth(token)).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<Value> {
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(url).bearer_auth(token).json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url).bearer_auth(token)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_response(status, &body).into());
        }

        // DELETE and some PUTs answer 200/202/204 without a body
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

/// Format an API error for display
///
/// The full context chain is kept; known statuses get a hint appended.
pub fn format_arm_error(error: &anyhow::Error) -> String {
    let hint = error.downcast_ref::<ApiError>().and_then(|api| match api.status {
        StatusCode::UNAUTHORIZED => Some(
            "Authentication failed. Check AZURE_ACCESS_TOKEN or the service principal credentials.",
        ),
        StatusCode::FORBIDDEN => {
            Some("Permission denied. Check the role assignments of the identity in use.")
        }
        StatusCode::NOT_FOUND => Some("Resource not found."),
        StatusCode::CONFLICT => Some("Resource conflict. The resource may already exist or be in use."),
        StatusCode::TOO_MANY_REQUESTS => Some("Rate limit exceeded. Please try again later."),
        status if status.is_server_error() => {
            Some("Azure service temporarily unavailable. Please try again.")
        }
        _ => None,
    });

    match hint {
        Some(hint) => format!("{:#}\n\n{}", error, hint),
        None => format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\tb\nc"), "abc");
    }

    #[test]
    fn test_api_error_from_arm_body() {
        let body = r#"{"error":{"code":"ResourceNotFound","message":"The Resource was not found."}}"#;
        let err = ApiError::from_response(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(err.code, "ResourceNotFound");
        assert_eq!(err.message, "The Resource was not found.");
    }

    #[test]
    fn test_api_error_without_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.code, "Unknown");
        assert_eq!(err.message, "Bad Gateway");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_survives_context() {
        let err: anyhow::Error = ApiError::from_response(StatusCode::NOT_FOUND, "").into();
        let err = err.context("retrieving thing");
        assert!(response_was_not_found(&err));

        let other = anyhow::anyhow!("404 in a plain message");
        assert!(!response_was_not_found(&other));
    }

    #[test]
    fn test_format_arm_error() {
        let err = anyhow::Error::from(ApiError::from_response(StatusCode::FORBIDDEN, ""))
            .context("deleting Snapshot Policy \"policy1\"")
            .context("deleting azurerm_netapp_snapshot_policy.main");
        let formatted = format_arm_error(&err);
        assert!(formatted.starts_with("deleting azurerm_netapp_snapshot_policy.main: deleting Snapshot Policy"), "{}", formatted);
        assert!(formatted.contains("403"), "{}", formatted);
        assert!(formatted.ends_with("Permission denied. Check the role assignments of the identity in use."));

        let err: anyhow::Error = ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidParameter".to_string(),
            message: "bad name".to_string(),
        }
        .into();
        let formatted = format_arm_error(&err);
        assert!(formatted.contains("(InvalidParameter): bad name"), "{}", formatted);
        assert!(!formatted.contains("\n\n"), "{}", formatted);

        let err = anyhow::anyhow!("reading state").context("applying main.yaml");
        assert_eq!(format_arm_error(&err), "applying main.yaml: reading state");
    }
}
