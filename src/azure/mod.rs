//! Azure Resource Manager interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens (static or service principal client secret)
//! - [`client`] - Main client addressing resources by canonical id
//! - [`http`] - HTTP utilities and the typed [`ApiError`](http::ApiError)
//!
//! # Example
//!
//! ```ignore
//! use azrm::azure::{auth::AzureCredentials, client::ArmClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let credentials = AzureCredentials::from_env(None, None)?;
//!     let client = ArmClient::new(credentials, "00000000-0000-0000-0000-000000000000", client::DEFAULT_ENDPOINT)?;
//!     let account = client.get("/subscriptions/.../netAppAccounts/account1", "2021-06-01").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
