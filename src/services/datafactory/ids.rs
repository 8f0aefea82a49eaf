//! Data Factory ids

use crate::resourceids::Segment;

crate::define_resource_id! {
    /// The Resource ID for a Data Factory
    pub struct DataFactoryId("Data Factory") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        factory_name: "factoryName" => "Factory Name",
    }
    segments = [
        Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("staticResourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::static_segment("staticProviders", "providers", "providers"),
        Segment::resource_provider("staticMicrosoftDataFactory", "Microsoft.DataFactory", "Microsoft.DataFactory"),
        Segment::static_segment("staticFactories", "factories", "factories"),
        Segment::user_specified("factoryName", "factoryValue"),
    ];
}

crate::define_resource_id! {
    /// The Resource ID for a Data Factory Linked Service
    pub struct LinkedServiceId("Linked Service") {
        subscription_id: "subscriptionId" => "Subscription",
        resource_group: "resourceGroup" => "Resource Group",
        factory_name: "factoryName" => "Factory Name",
        name: "linkedServiceName" => "Linked Service Name",
    }
    segments = [
        Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
        Segment::static_segment("staticResourceGroups", "resourceGroups", "resourceGroups"),
        Segment::resource_group("resourceGroup", "example-resource-group"),
        Segment::static_segment("staticProviders", "providers", "providers"),
        Segment::resource_provider("staticMicrosoftDataFactory", "Microsoft.DataFactory", "Microsoft.DataFactory"),
        Segment::static_segment("staticFactories", "factories", "factories"),
        Segment::user_specified("factoryName", "factoryValue"),
        Segment::static_segment("staticLinkedServices", "linkedservices", "linkedservices"),
        Segment::user_specified("linkedServiceName", "linkedServiceValue"),
    ];
}

impl LinkedServiceId {
    /// The factory this linked service belongs to
    pub fn data_factory_id(&self) -> DataFactoryId {
        DataFactoryId::new(
            self.subscription_id.clone(),
            self.resource_group.clone(),
            self.factory_name.clone(),
        )
    }
}

impl DataFactoryId {
    /// A linked service below this factory
    pub fn linked_service(&self, name: impl Into<String>) -> LinkedServiceId {
        LinkedServiceId::new(
            self.subscription_id.clone(),
            self.resource_group.clone(),
            self.factory_name.clone(),
            name,
        )
    }
}
