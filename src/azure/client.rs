//! Resource Manager Client
//!
//! Main client for Azure Resource Manager, combining authentication, the
//! HTTP layer and the endpoint/subscription the provider is configured for.
//! Every call is addressed by a canonical resource id path.

use super::auth::AzureCredentials;
use super::http::ArmHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

/// Public cloud Resource Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Main Resource Manager client
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: AzureCredentials,
    pub http: ArmHttpClient,
    pub subscription_id: String,
    endpoint: Url,
}

impl ArmClient {
    /// Create a new client for `subscription_id` against `endpoint`
    pub fn new(
        credentials: AzureCredentials,
        subscription_id: &str,
        endpoint: &str,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid Resource Manager endpoint {:?}", endpoint))?;

        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            subscription_id: subscription_id.to_string(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the URL of a resource from its canonical id
    pub fn resource_url(&self, id: &str, api_version: &str) -> Result<String> {
        let mut url = self
            .endpoint
            .join(id)
            .with_context(|| format!("Invalid resource id {:?}", id))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url.to_string())
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// GET a resource
    pub async fn get(&self, id: &str, api_version: &str) -> Result<Value> {
        let url = self.resource_url(id, api_version)?;
        let token = self.get_token().await?;
        self.http.get(&url, &token).await
    }

    /// PUT (create or replace) a resource
    pub async fn put(&self, id: &str, api_version: &str, body: &Value) -> Result<Value> {
        let url = self.resource_url(id, api_version)?;
        let token = self.get_token().await?;
        self.http.put(&url, &token, body).await
    }

    /// DELETE a resource
    pub async fn delete(&self, id: &str, api_version: &str) -> Result<Value> {
        let url = self.resource_url(id, api_version)?;
        let token = self.get_token().await?;
        self.http.delete(&url, &token).await
    }
}
