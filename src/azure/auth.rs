//! Azure Authentication
//!
//! Obtains bearer tokens for Azure Resource Manager, either from a
//! pre-issued access token or through the OAuth2 client credentials flow
//! of a service principal.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Scope requested for Resource Manager access
pub const DEFAULT_SCOPE: &str = "https://management.azure.com/.default";

/// Default Microsoft Entra authority
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL assumed for static tokens and token responses without `expires_in`
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where tokens come from
enum TokenSource {
    /// A token issued out of band (e.g. `az account get-access-token`)
    Static(String),
    /// Service principal client secret
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
        authority: String,
        http: reqwest::Client,
    },
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct AzureCredentials {
    source: Arc<TokenSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl AzureCredentials {
    fn from_source(source: TokenSource) -> Self {
        Self {
            source: Arc::new(source),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Use a pre-issued access token
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::from_source(TokenSource::Static(token.into()))
    }

    /// Use the client credentials flow of a service principal
    pub fn client_secret(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::client_secret_with_authority(tenant_id, client_id, client_secret, DEFAULT_AUTHORITY)
    }

    /// Client credentials flow against a specific authority host
    pub fn client_secret_with_authority(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authority: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(super::http::USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::from_source(TokenSource::ClientSecret {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: authority.trim_end_matches('/').to_string(),
            http,
        }))
    }

    /// Pick a credential from the environment
    ///
    /// `AZURE_ACCESS_TOKEN` wins; otherwise `AZURE_CLIENT_SECRET` together with
    /// a tenant and client id (from `tenant_id`/`client_id` or
    /// `AZURE_TENANT_ID`/`AZURE_CLIENT_ID`).
    pub fn from_env(tenant_id: Option<String>, client_id: Option<String>) -> Result<Self> {
        if let Ok(token) = std::env::var("AZURE_ACCESS_TOKEN") {
            if !token.is_empty() {
                tracing::debug!("Using access token from AZURE_ACCESS_TOKEN");
                return Ok(Self::static_token(token));
            }
        }

        let tenant_id = tenant_id.or_else(|| std::env::var("AZURE_TENANT_ID").ok());
        let client_id = client_id.or_else(|| std::env::var("AZURE_CLIENT_ID").ok());
        let client_secret = std::env::var("AZURE_CLIENT_SECRET").ok();

        match (tenant_id, client_id, client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                tracing::debug!("Using client secret credentials for client {}", client_id);
                Self::client_secret(tenant_id, client_id, client_secret)
            }
            _ => Err(anyhow::anyhow!(
                "No Azure credentials found. Set AZURE_ACCESS_TOKEN, or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
            )),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = self.fetch_token().await?;
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    async fn fetch_token(&self) -> Result<(String, Duration)> {
        match self.source.as_ref() {
            TokenSource::Static(token) => Ok((token.clone(), DEFAULT_TOKEN_TTL)),
            TokenSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
                authority,
                http,
            } => {
                let url = format!(
                    "{}/{}/oauth2/v2.0/token",
                    authority,
                    urlencoding::encode(tenant_id)
                );
                let form = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", DEFAULT_SCOPE),
                ];

                tracing::debug!("POST {}", url);
                let response = http
                    .post(&url)
                    .form(&form)
                    .send()
                    .await
                    .context("Failed to send token request")?;

                let status = response.status();
                if !status.is_success() {
                    // Security: the body may echo request details, don't log it
                    return Err(anyhow::anyhow!(
                        "Failed to get access token: token endpoint returned {}",
                        status
                    ));
                }

                let token: TokenResponse = response
                    .json()
                    .await
                    .context("Failed to parse token response")?;

                let ttl = token
                    .expires_in
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TOKEN_TTL);

                Ok((token.access_token, ttl))
            }
        }
    }
}
