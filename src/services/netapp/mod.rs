//! Azure NetApp Files

mod ids;
mod snapshot_policy_resource;
pub mod validate;

pub use ids::{NetAppAccountId, SnapshotPolicyId};
pub use snapshot_policy_resource::{
    DailySchedule, HourlySchedule, MonthlySchedule, SnapshotPolicyModel, SnapshotPolicyResource,
    WeeklySchedule,
};

pub const API_VERSION: &str = "2021-06-01";
