//! Azure AD B2C directories

mod directory_data_source;
mod ids;

pub use directory_data_source::{AadB2cDirectoryDataSource, AadB2cDirectoryDataSourceModel};
pub use ids::{B2cDirectoryId, ResourceGroupId};

pub const API_VERSION: &str = "2021-04-01-preview";
