//! Service implementations
//!
//! Each service module declares its resource ids, validators and the
//! resources or data sources built on top of them.

pub mod aadb2c;
pub mod datafactory;
pub mod netapp;

use crate::resource::Registry;
use crate::resourceids::IdType;

/// Register every resource and data source
pub fn register_all(registry: &mut Registry) {
    registry.register_data_source(aadb2c::AadB2cDirectoryDataSource);
    registry.register_resource(datafactory::LinkedServiceWebResource);
    registry.register_resource(netapp::SnapshotPolicyResource);
}

/// Every identifier type, for the `id` commands
pub fn id_types() -> Vec<IdType> {
    vec![
        IdType::of::<aadb2c::B2cDirectoryId>("aadb2c-directory"),
        IdType::of::<aadb2c::ResourceGroupId>("aadb2c-resource-group"),
        IdType::of::<datafactory::DataFactoryId>("datafactory"),
        IdType::of::<datafactory::LinkedServiceId>("datafactory-linked-service"),
        IdType::of::<netapp::NetAppAccountId>("netapp-account"),
        IdType::of::<netapp::SnapshotPolicyId>("netapp-snapshot-policy"),
    ]
}

/// Look an identifier type up by its command line name
pub fn id_type(name: &str) -> Option<IdType> {
    id_types().into_iter().find(|id_type| id_type.name == name)
}
