//! Resource ID segments

/// The kind of a single `/`-delimited resource ID segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// A fixed literal such as `subscriptions` or `netAppAccounts`
    Static,
    /// A fixed resource provider namespace such as `Microsoft.NetApp`
    ResourceProvider,
    SubscriptionId,
    ResourceGroup,
    /// A name chosen by the user
    UserSpecified,
}

/// One element of a resource ID grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Machine name, used as the key of the parse result
    pub name: &'static str,
    pub kind: SegmentKind,
    /// Literal value for static and resource provider segments
    pub fixed_value: Option<&'static str>,
    /// Example value used to describe the expected shape in errors
    pub example_value: &'static str,
}

impl Segment {
    pub const fn static_segment(
        name: &'static str,
        fixed_value: &'static str,
        example_value: &'static str,
    ) -> Self {
        Self {
            name,
            kind: SegmentKind::Static,
            fixed_value: Some(fixed_value),
            example_value,
        }
    }

    pub const fn resource_provider(
        name: &'static str,
        fixed_value: &'static str,
        example_value: &'static str,
    ) -> Self {
        Self {
            name,
            kind: SegmentKind::ResourceProvider,
            fixed_value: Some(fixed_value),
            example_value,
        }
    }

    pub const fn subscription_id(name: &'static str, example_value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::SubscriptionId,
            fixed_value: None,
            example_value,
        }
    }

    pub const fn resource_group(name: &'static str, example_value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::ResourceGroup,
            fixed_value: None,
            example_value,
        }
    }

    pub const fn user_specified(name: &'static str, example_value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::UserSpecified,
            fixed_value: None,
            example_value,
        }
    }

    /// Whether this segment must match a literal
    pub const fn is_literal(&self) -> bool {
        self.fixed_value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_segments_carry_their_value() {
        let s = Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions");
        assert!(s.is_literal());
        assert_eq!(s.fixed_value, Some("subscriptions"));
        assert_eq!(s.kind, SegmentKind::Static);

        let p = Segment::resource_provider("staticMicrosoftNetApp", "Microsoft.NetApp", "Microsoft.NetApp");
        assert!(p.is_literal());
        assert_eq!(p.kind, SegmentKind::ResourceProvider);
    }

    #[test]
    fn test_variable_segments_have_no_fixed_value() {
        for s in [
            Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
            Segment::resource_group("resourceGroup", "example-resource-group"),
            Segment::user_specified("name", "nameValue"),
        ] {
            assert!(!s.is_literal());
            assert!(s.fixed_value.is_none());
        }
    }
}
