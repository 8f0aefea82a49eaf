//! Macro for declaring typed resource IDs.

/// Declare a typed resource ID from its fields and segment grammar.
///
/// This generates a struct with one `String` per variable segment plus:
/// - `new()` taking the field values in order
/// - `parse()` and `parse_insensitively()`
/// - `validate()` usable as a schema validator
/// - `id()` returning the canonical path
/// - the [`ResourceId`](crate::resourceids::ResourceId) implementation
/// - a multi-line `Display` used in diagnostics
/// - `FromStr`, `Serialize` and `Deserialize` through the canonical path
///
/// Each field is written `field: "segmentName" => "Label"`, where the
/// segment name must match a variable segment of the grammar.
///
/// # Example
///
/// ```ignore
/// define_resource_id! {
///     /// The Resource ID for a NetApp Account
///     pub struct NetAppAccountId("Net App Account") {
///         subscription_id: "subscriptionId" => "Subscription",
///         resource_group: "resourceGroup" => "Resource Group",
///         name: "netAppAccountName" => "Net App Account Name",
///     }
///     segments = [
///         Segment::static_segment("staticSubscriptions", "subscriptions", "subscriptions"),
///         Segment::subscription_id("subscriptionId", "12345678-1234-9876-4563-123456789012"),
///         // ...
///     ];
/// }
/// ```
#[macro_export]
macro_rules! define_resource_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($description:literal) {
            $( $field:ident : $segment_name:literal => $label:literal ),+ $(,)?
        }
        segments = [ $( $segment:expr ),+ $(,)? ];
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $( pub $field: String, )+
        }

        impl $name {
            /// Assemble an id from known field values.
            #[must_use]
            pub fn new($( $field: impl Into<String> ),+) -> Self {
                Self {
                    $( $field: $field.into(), )+
                }
            }

            /// Parse a canonical path, matching literals exactly.
            pub fn parse(input: &str) -> Result<Self, $crate::resourceids::ParseError> {
                $crate::resourceids::parse_id(input)
            }

            /// Parse a path ignoring the case of literal segments.
            ///
            /// Only for ids returned by the API, never for user input.
            pub fn parse_insensitively(input: &str) -> Result<Self, $crate::resourceids::ParseError> {
                $crate::resourceids::parse_id_insensitively(input)
            }

            /// Check that a raw configuration value parses as this id.
            pub fn validate(value: &serde_json::Value, key: &str) -> $crate::validation::Validation {
                $crate::resourceids::validate_id::<Self>(value, key)
            }

            /// The canonical path.
            pub fn id(&self) -> String {
                <Self as $crate::resourceids::ResourceId>::id(self)
            }
        }

        impl $crate::resourceids::ResourceId for $name {
            const DESCRIPTION: &'static str = $description;
            const SEGMENTS: &'static [$crate::resourceids::Segment] = &[ $( $segment ),+ ];

            fn segment_value(&self, name: &str) -> Option<&str> {
                match name {
                    $( $segment_name => Some(self.$field.as_str()), )+
                    _ => None,
                }
            }

            fn from_parse_result(
                result: &$crate::resourceids::ParseResult,
            ) -> Result<Self, $crate::resourceids::ParseError> {
                Ok(Self {
                    $( $field: result.segment($segment_name)?, )+
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let components = [
                    $( format!("{}: {:?}", $label, self.$field), )+
                ];
                write!(f, "{} ({})", $description, components.join("\n"))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::resourceids::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.id())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
