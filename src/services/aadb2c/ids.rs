//! Azure AD B2C tenant ids

use crate::resourceids::Segment;

crate::define_resource_id! {
    /// The Resource ID for a B2C Directory
    pub struct B2cDirectoryId("B2C Directory") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        directory_name: "directoryName" => "Directory Name",
    }
    segments = [
        Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("staticResourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::static_segment("staticProviders", "providers", "providers"),
        Segment::resource_provider(
            "staticMicrosoftAzureActiveDirectory",
            "Microsoft.AzureActiveDirectory",
            "Microsoft.AzureActiveDirectory"
        ),
        Segment::static_segment("staticB2cDirectories", "b2cDirectories", "b2cDirectories"),
        Segment::user_specified("directoryName", "directoryValue"),
    ];
}

crate::define_resource_id! {
    /// The Resource ID for a Resource Group scoped directory name
    ///
    /// Used by the tenants API for name availability checks, which address a
    /// directory directly below the resource group.
    pub struct ResourceGroupId("Resource Group") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        directory_name: "directoryName" => "Directory Name",
    }
    segments = [
        Segment::static_segment("subscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("resourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::user_specified("directoryName", "directoryValue"),
    ];
}
