//! Segment-by-segment resource ID parser and formatter

use super::error::ParseError;
use super::segment::Segment;
use std::collections::HashMap;

/// Values extracted from a resource ID, keyed by segment name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub raw_input: String,
    pub parsed: HashMap<String, String>,
}

impl ParseResult {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parsed.get(name).map(String::as_str)
    }

    /// Owned value of a segment the caller requires
    pub fn segment(&self, name: &str) -> Result<String, ParseError> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingSegment {
                input: self.raw_input.clone(),
                name: name.to_string(),
            })
    }
}

/// Matches path strings against an ordered segment grammar
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    segments: &'a [Segment],
}

impl<'a> Parser<'a> {
    pub fn new(segments: &'a [Segment]) -> Self {
        Self { segments }
    }

    /// Parse `input` left to right.
    ///
    /// With `insensitively` set, static segments are compared ignoring ASCII
    /// case. Variable segments are always bound verbatim.
    pub fn parse(&self, input: &str, insensitively: bool) -> Result<ParseResult, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let Some(path) = input.strip_prefix('/') else {
            return Err(ParseError::NotAbsolute {
                input: input.to_string(),
            });
        };

        let components: Vec<&str> = path.split('/').collect();
        if components.len() != self.segments.len() {
            return Err(ParseError::SegmentCount {
                input: input.to_string(),
                expected: self.segments.len(),
                actual: components.len(),
                example: self.example(),
            });
        }

        let mut parsed = HashMap::with_capacity(self.segments.len());

        for (position, (segment, component)) in self.segments.iter().zip(components).enumerate() {
            match segment.fixed_value {
                Some(expected) => {
                    let matches = if insensitively {
                        component.eq_ignore_ascii_case(expected)
                    } else {
                        component == expected
                    };

                    if !matches {
                        return Err(ParseError::LiteralMismatch {
                            input: input.to_string(),
                            position,
                            expected,
                            actual: component.to_string(),
                        });
                    }
                }
                None => {
                    if component.is_empty() {
                        return Err(ParseError::EmptyValue {
                            input: input.to_string(),
                            position,
                            name: segment.name,
                        });
                    }
                }
            }

            parsed.insert(segment.name.to_string(), component.to_string());
        }

        Ok(ParseResult {
            raw_input: input.to_string(),
            parsed,
        })
    }

    /// An example ID built from each segment's literal or example value
    pub fn example(&self) -> String {
        format_segments(
            self.segments
                .iter()
                .map(|s| s.fixed_value.unwrap_or(s.example_value)),
        )
    }
}

/// Join segment values into a canonical `/a/b/c` path
pub fn format_segments<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for value in values {
        out.push('/');
        out.push_str(value);
    }
    out
}
