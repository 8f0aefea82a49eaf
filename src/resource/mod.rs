//! Resource abstraction layer
//!
//! Resources (managed objects with create/read/update/delete) and data
//! sources (read-only lookups) are implemented against typed models. The
//! loosely-typed configuration object is validated against the schema and
//! decoded into the model once, at the boundary, by the blanket
//! implementations in this module.
//!
//! # Architecture
//!
//! - [`schema`] - Attribute declarations and configuration validation
//! - [`registry`] - The set of resources and data sources built at startup
//! - [`dispatch`] - Routes operations to handlers under their timeouts
//! - [`timeouts`] - Per-operation time limits

pub mod dispatch;
pub mod registry;
pub mod schema;
pub mod timeouts;

pub use dispatch::{Dispatcher, ResourceState};
pub use registry::Registry;
pub use schema::{Attribute, AttributeType, Schema};
pub use timeouts::Timeouts;

use crate::azure::client::ArmClient;
use crate::resourceids::ParseError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Flat key/value configuration or state of one object
pub type Attributes = Map<String, Value>;

/// A managed remote object with a typed model
#[async_trait]
pub trait TypedResource: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Send + Sync;

    fn resource_type(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Check an id handed to `import`
    fn validate_import_id(&self, id: &str) -> Result<(), ParseError>;

    /// Create the object and return its canonical id
    async fn create(&self, client: &ArmClient, model: Self::Model) -> Result<String>;

    /// Read the object; `None` when it no longer exists
    async fn read(
        &self,
        client: &ArmClient,
        id: &str,
        prior: Option<Self::Model>,
    ) -> Result<Option<Self::Model>>;

    async fn update(&self, client: &ArmClient, id: &str, model: Self::Model) -> Result<()>;

    async fn delete(&self, client: &ArmClient, id: &str) -> Result<()>;
}

/// A read-only lookup with a typed model
#[async_trait]
pub trait TypedDataSource: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Send + Sync;

    fn data_source_type(&self) -> &'static str;

    /// Attributes the user sets
    fn arguments(&self) -> Schema;

    /// Attributes the provider reports
    fn attributes(&self) -> Schema;

    fn read_timeout(&self) -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Look the object up; returns its canonical id and the filled model
    async fn read(&self, client: &ArmClient, model: Self::Model) -> Result<(String, Self::Model)>;
}

/// Object-safe view of a [`TypedResource`] working on raw attributes
#[async_trait]
pub trait Resource: Send + Sync {
    fn resource_type(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn timeouts(&self) -> Timeouts;
    fn validate_import_id(&self, id: &str) -> Result<(), ParseError>;
    async fn create(&self, client: &ArmClient, config: &Attributes) -> Result<String>;
    async fn read(
        &self,
        client: &ArmClient,
        id: &str,
        prior: Option<&Attributes>,
    ) -> Result<Option<Attributes>>;
    async fn update(&self, client: &ArmClient, id: &str, config: &Attributes) -> Result<()>;
    async fn delete(&self, client: &ArmClient, id: &str) -> Result<()>;
}

/// Object-safe view of a [`TypedDataSource`]
#[async_trait]
pub trait DataSource: Send + Sync {
    fn data_source_type(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn arguments(&self) -> Schema;
    fn read_timeout(&self) -> Duration;
    async fn read(&self, client: &ArmClient, config: &Attributes) -> Result<(String, Attributes)>;
}

/// Decode raw attributes into a typed model
///
/// Null values count as unset, so they are dropped before decoding.
pub fn decode<M: DeserializeOwned>(resource_type: &str, attributes: &Attributes) -> Result<M> {
    let set: Attributes = attributes
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    serde_json::from_value(Value::Object(set))
        .with_context(|| format!("decoding configuration of {}", resource_type))
}

/// Encode a typed model into raw attributes
pub fn encode<M: Serialize>(resource_type: &str, model: &M) -> Result<Attributes> {
    match serde_json::to_value(model)
        .with_context(|| format!("encoding state of {}", resource_type))?
    {
        Value::Object(attributes) => Ok(attributes),
        other => Err(anyhow::anyhow!(
            "encoding state of {}: expected an object, got {}",
            resource_type,
            other
        )),
    }
}

/// Error returned when creating an object that already exists remotely
pub fn import_as_exists_error(resource_type: &str, id: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "A resource with the ID {:?} already exists - to be managed via azrm this resource needs to be imported into the state. Please see `azrm import {} <name> {}` for more information.",
        id,
        resource_type,
        id
    )
}

#[async_trait]
impl<T: TypedResource> Resource for T {
    fn resource_type(&self) -> &'static str {
        TypedResource::resource_type(self)
    }

    fn schema(&self) -> Schema {
        TypedResource::schema(self)
    }

    fn timeouts(&self) -> Timeouts {
        TypedResource::timeouts(self)
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ParseError> {
        TypedResource::validate_import_id(self, id)
    }

    async fn create(&self, client: &ArmClient, config: &Attributes) -> Result<String> {
        let model = decode(TypedResource::resource_type(self), config)?;
        TypedResource::create(self, client, model).await
    }

    async fn read(
        &self,
        client: &ArmClient,
        id: &str,
        prior: Option<&Attributes>,
    ) -> Result<Option<Attributes>> {
        let resource_type = TypedResource::resource_type(self);
        let prior = match prior {
            Some(attributes) => Some(decode(resource_type, attributes)?),
            None => None,
        };

        match TypedResource::read(self, client, id, prior).await? {
            Some(model) => Ok(Some(encode(resource_type, &model)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, client: &ArmClient, id: &str, config: &Attributes) -> Result<()> {
        let model = decode(TypedResource::resource_type(self), config)?;
        TypedResource::update(self, client, id, model).await
    }

    async fn delete(&self, client: &ArmClient, id: &str) -> Result<()> {
        TypedResource::delete(self, client, id).await
    }
}

#[async_trait]
impl<T: TypedDataSource> DataSource for T {
    fn data_source_type(&self) -> &'static str {
        TypedDataSource::data_source_type(self)
    }

    fn schema(&self) -> Schema {
        TypedDataSource::arguments(self).merge(TypedDataSource::attributes(self))
    }

    fn arguments(&self) -> Schema {
        TypedDataSource::arguments(self)
    }

    fn read_timeout(&self) -> Duration {
        TypedDataSource::read_timeout(self)
    }

    async fn read(&self, client: &ArmClient, config: &Attributes) -> Result<(String, Attributes)> {
        let data_source_type = TypedDataSource::data_source_type(self);
        let model = decode(data_source_type, config)?;
        let (id, model) = TypedDataSource::read(self, client, model).await?;
        Ok((id, encode(data_source_type, &model)?))
    }
}
