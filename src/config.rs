//! Configuration Management
//!
//! Handles persistent configuration storage for azrm.

use crate::azure::client::DEFAULT_ENDPOINT;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Subscription new objects are created in
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Azure AD tenant used for client secret authentication
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Application (client) id used for client secret authentication
    #[serde(default)]
    pub client_id: Option<String>,
    /// Resource manager endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Where the state file lives
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

/// Keys accepted by `azrm config set`
pub const KEYS: &[&str] = &[
    "subscription_id",
    "tenant_id",
    "client_id",
    "endpoint",
    "state_path",
];

impl Config {
    /// Directory holding the config, log and default state files
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azrm"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(anyhow!("no configuration directory on this platform"));
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Set one key by name, validating ids
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "subscription_id" => self.subscription_id = Some(parse_uuid(key, value)?),
            "tenant_id" => self.tenant_id = Some(parse_uuid(key, value)?),
            "client_id" => self.client_id = Some(value.to_string()),
            "endpoint" => {
                url::Url::parse(value).with_context(|| format!("invalid endpoint {:?}", value))?;
                self.endpoint = Some(value.to_string());
            }
            "state_path" => self.state_path = Some(PathBuf::from(value)),
            _ => bail!("unknown config key {:?}, expected one of {:?}", key, KEYS),
        }
        Ok(())
    }

    /// Get effective subscription (CLI > config > AZURE_SUBSCRIPTION_ID)
    pub fn effective_subscription_id(&self, flag: Option<&str>) -> Result<String> {
        let value = pick(flag, self.subscription_id.as_deref(), env("AZURE_SUBSCRIPTION_ID"))
            .ok_or_else(|| {
                anyhow!("no subscription configured: pass --subscription-id, run `azrm config set subscription_id <id>` or set AZURE_SUBSCRIPTION_ID")
            })?;
        parse_uuid("subscription_id", &value)
    }

    /// Get effective tenant (CLI > config > AZURE_TENANT_ID)
    pub fn effective_tenant_id(&self, flag: Option<&str>) -> Result<Option<String>> {
        pick(flag, self.tenant_id.as_deref(), env("AZURE_TENANT_ID"))
            .map(|value| parse_uuid("tenant_id", &value))
            .transpose()
    }

    /// Get effective client id (CLI > config > AZURE_CLIENT_ID)
    pub fn effective_client_id(&self, flag: Option<&str>) -> Option<String> {
        pick(flag, self.client_id.as_deref(), env("AZURE_CLIENT_ID"))
    }

    /// Get effective endpoint (CLI > config > AZURE_RESOURCE_MANAGER_ENDPOINT > public cloud)
    pub fn effective_endpoint(&self, flag: Option<&str>) -> String {
        pick(
            flag,
            self.endpoint.as_deref(),
            env("AZURE_RESOURCE_MANAGER_ENDPOINT"),
        )
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective state file (CLI > config > config directory > working directory)
    pub fn effective_state_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.state_path.clone())
            .or_else(|| Self::dir().map(|dir| dir.join("state.json")))
            .unwrap_or_else(|| PathBuf::from("azrm.state.json"))
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First non-empty of flag, configured value and environment
fn pick(flag: Option<&str>, configured: Option<&str>, environment: Option<String>) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| configured.map(str::to_string))
        .or(environment)
        .filter(|value| !value.trim().is_empty())
}

/// Subscription and tenant ids are UUIDs; returns the hyphenated form
fn parse_uuid(key: &str, value: &str) -> Result<String> {
    Uuid::parse_str(value.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .with_context(|| format!("{} must be a UUID, got {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBSCRIPTION: &str = "12345678-1234-9876-4563-123456789012";

    #[test]
    fn test_pick_precedence() {
        assert_eq!(
            pick(Some("flag"), Some("config"), Some("env".to_string())).as_deref(),
            Some("flag")
        );
        assert_eq!(
            pick(None, Some("config"), Some("env".to_string())).as_deref(),
            Some("config")
        );
        assert_eq!(pick(None, None, Some("env".to_string())).as_deref(), Some("env"));
        assert_eq!(pick(None, Some(""), None), None);
    }

    #[test]
    fn test_subscription_must_be_uuid() {
        let config = Config {
            subscription_id: Some("not-a-uuid".to_string()),
            ..Config::default()
        };
        assert!(config.effective_subscription_id(None).is_err());
        assert_eq!(
            config.effective_subscription_id(Some(SUBSCRIPTION)).unwrap(),
            SUBSCRIPTION
        );
    }

    #[test]
    fn test_set_validates() {
        let mut config = Config::default();
        config.set("subscription_id", SUBSCRIPTION).unwrap();
        config.set("endpoint", "http://localhost:8080").unwrap();
        assert!(config.set("tenant_id", "contoso").is_err());
        assert!(config.set("endpoint", "not a url").is_err());
        assert!(config.set("zone", "x").is_err());

        assert_eq!(config.subscription_id.as_deref(), Some(SUBSCRIPTION));
        assert_eq!(config.effective_endpoint(None), "http://localhost:8080");
        assert_eq!(config.effective_endpoint(Some("http://other")), "http://other");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            subscription_id: Some(SUBSCRIPTION.to_string()),
            state_path: Some(PathBuf::from("/tmp/state.json")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert_eq!(
            config.effective_state_path(None),
            PathBuf::from("/tmp/state.json")
        );
        assert_eq!(
            config.effective_state_path(Some(Path::new("local.json"))),
            PathBuf::from("local.json")
        );
    }
}
