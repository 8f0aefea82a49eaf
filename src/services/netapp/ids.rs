//! NetApp ids

use crate::resourceids::Segment;

crate::define_resource_id! {
    /// The Resource ID for a NetApp Account
    pub struct NetAppAccountId("Net App Account") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        name: "netAppAccountName" => "Net App Account Name",
    }
    segments = [
        Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("staticResourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::static_segment("staticProviders", "providers", "providers"),
        Segment::resource_provider("staticMicrosoftNetApp", "Microsoft.NetApp", "Microsoft.NetApp"),
        Segment::static_segment("staticNetAppAccounts", "netAppAccounts", "netAppAccounts"),
        Segment::user_specified("netAppAccountName", "netAppAccountValue"),
    ];
}

crate::define_resource_id! {
    /// The Resource ID for a NetApp Snapshot Policy
    pub struct SnapshotPolicyId("Snapshot Policy") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        net_app_account_name: "netAppAccountName" => "Net App Account Name",
        name: "snapshotPolicyName" => "Snapshot Policy Name",
    }
    segments = [
        Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("staticResourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::static_segment("staticProviders", "providers", "providers"),
        Segment::resource_provider("staticMicrosoftNetApp", "Microsoft.NetApp", "Microsoft.NetApp"),
        Segment::static_segment("staticNetAppAccounts", "netAppAccounts", "netAppAccounts"),
        Segment::user_specified("netAppAccountName", "netAppAccountValue"),
        Segment::static_segment("staticSnapshotPolicies", "snapshotPolicies", "snapshotPolicies"),
        Segment::user_specified("snapshotPolicyName", "snapshotPolicyValue"),
    ];
}

impl SnapshotPolicyId {
    pub fn account_id(&self) -> NetAppAccountId {
        NetAppAccountId::new(
            self.subscription_id.clone(),
            self.resource_group.clone(),
            self.net_app_account_name.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_formatter() {
        let actual = NetAppAccountId::new("12345678-1234-9876-4563-123456789012", "resGroup1", "account1").id();
        assert_eq!(
            actual,
            "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.NetApp/netAppAccounts/account1"
        );
    }

    #[test]
    fn test_snapshot_policy_account() {
        let id = SnapshotPolicyId::new(
            "12345678-1234-9876-4563-123456789012",
            "resGroup1",
            "account1",
            "snapshotpolicy1",
        );
        assert!(id.id().starts_with(&id.account_id().id()));
        assert!(id.id().ends_with("/snapshotPolicies/snapshotpolicy1"));
    }
}
