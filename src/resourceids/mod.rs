//! Typed resource IDs
//!
//! Every remote object is addressed by a canonical path such as
//! `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroup}/providers/Microsoft.NetApp/netAppAccounts/{netAppAccountName}`.
//! Each resource type declares the ordered [`Segment`] list of its path once
//! (see [`define_resource_id!`](crate::define_resource_id)); formatting,
//! parsing and validation are derived from that list.
//!
//! # Module Structure
//!
//! - [`segment`] - Segment kinds and constructors
//! - [`parser`] - Left-to-right parser and path formatter
//! - [`error`] - Parse errors
//!
//! Case-insensitive parsing exists for ids read back from API responses,
//! whose casing the service may alter. Configuration input always goes
//! through [`validate_id`], which parses case-sensitively.

mod error;
mod macros;
mod parser;
mod segment;

pub use error::ParseError;
pub use parser::{format_segments, ParseResult, Parser};
pub use segment::{Segment, SegmentKind};

use crate::validation::{expect_str, Validation};
use serde_json::Value;

/// A resource identifier with a fixed segment grammar
pub trait ResourceId: Sized {
    /// Human readable resource type, e.g. "Snapshot Policy"
    const DESCRIPTION: &'static str;

    /// Ordered segment grammar of the canonical path
    const SEGMENTS: &'static [Segment];

    /// Value bound to a variable segment
    fn segment_value(&self, name: &str) -> Option<&str>;

    /// Rebuild the identifier from a parse result
    fn from_parse_result(result: &ParseResult) -> Result<Self, ParseError>;

    /// Render the canonical path
    fn id(&self) -> String {
        format_segments(Self::SEGMENTS.iter().map(|segment| match segment.fixed_value {
            Some(fixed) => fixed,
            None => {
                let value = self.segment_value(segment.name);
                debug_assert!(
                    value.is_some(),
                    "segment {:?} has no field in {}",
                    segment.name,
                    Self::DESCRIPTION
                );
                value.unwrap_or_default()
            }
        }))
    }
}

/// Parse `input` as `T`, matching literal segments exactly
pub fn parse_id<T: ResourceId>(input: &str) -> Result<T, ParseError> {
    let parsed = Parser::new(T::SEGMENTS).parse(input, false)?;
    T::from_parse_result(&parsed)
}

/// Parse `input` as `T`, ignoring the case of literal segments
///
/// note: this should only be used for API response data and not user input
pub fn parse_id_insensitively<T: ResourceId>(input: &str) -> Result<T, ParseError> {
    let parsed = Parser::new(T::SEGMENTS).parse(input, true)?;
    T::from_parse_result(&parsed)
}

/// Validate that a raw configuration value is a string that parses as `T`
pub fn validate_id<T: ResourceId>(value: &Value, key: &str) -> Validation {
    let input = match expect_str(value, key) {
        Ok(input) => input,
        Err(validation) => return validation,
    };

    match parse_id::<T>(input) {
        Ok(_) => Validation::ok(),
        Err(err) => Validation::error(err.into()),
    }
}

/// Type-erased description of an identifier type
#[derive(Debug, Clone, Copy)]
pub struct IdType {
    /// Short name used on the command line, e.g. `netapp-snapshot-policy`
    pub name: &'static str,
    pub description: &'static str,
    pub segments: &'static [Segment],
}

impl IdType {
    pub fn of<T: ResourceId>(name: &'static str) -> Self {
        Self {
            name,
            description: T::DESCRIPTION,
            segments: T::SEGMENTS,
        }
    }

    pub fn parser(&self) -> Parser<'static> {
        Parser::new(self.segments)
    }

    /// Names of the segments a caller has to supply
    pub fn variable_segments(&self) -> impl Iterator<Item = &'static Segment> {
        self.segments.iter().filter(|s| !s.is_literal())
    }

    /// Format a path from values keyed by segment name
    pub fn format(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ParseError> {
        let mut values = Vec::with_capacity(self.segments.len());
        for segment in self.segments {
            match segment.fixed_value {
                Some(fixed) => values.push(fixed.to_string()),
                None => values.push(lookup(segment.name).ok_or_else(|| {
                    ParseError::MissingSegment {
                        input: self.parser().example(),
                        name: segment.name.to_string(),
                    }
                })?),
            }
        }
        Ok(format_segments(values.iter().map(String::as_str)))
    }
}
