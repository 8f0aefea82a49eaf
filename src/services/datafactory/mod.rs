//! Azure Data Factory

mod ids;
mod linked_service_web_resource;
mod models;
pub mod validate;

pub use ids::{DataFactoryId, LinkedServiceId};
pub use linked_service_web_resource::{LinkedServiceWebModel, LinkedServiceWebResource};

pub const API_VERSION: &str = "2018-06-01";
