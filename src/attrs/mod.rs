//! Attribute string parsing.
//!
//! Parses declarative attribute strings like
//! `shape=rounded&radius=12&left_top_radius=0` into [`Attributes`], then into
//! an [`ImageConfig`](crate::ImageConfig). Keys are case-insensitive and
//! accept the snake_case spelling, the camelCase spelling, and an `img_`
//! prefix (`img_leftTopRadius`).
//!
//! # Example
//!
//! ```
//! use zenmask::{MaskShape, attrs};
//!
//! let result = attrs::parse("shape=rounded&radius=12&right_bottom_radius=0&aspect_ratio=1.5");
//! assert!(result.warnings.is_empty());
//!
//! let config = result.attributes.to_config();
//! assert_eq!(config.shape, MaskShape::Round);
//! assert_eq!(config.radius, 12);
//! assert_eq!(config.aspect_ratio, 1.5);
//! ```
//!
//! Parsing never fails. Unknown keys, repeated keys, and unparseable values
//! are reported as [`ParseWarning`]s and otherwise ignored.

mod attributes;
mod convert;
mod parse;

pub use attributes::Attributes;

use alloc::string::String;
use alloc::vec::Vec;

/// Result of parsing an attribute string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed attributes.
    pub attributes: Attributes,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from attribute parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins). Aliases of one
    /// attribute share its snake_case name.
    DuplicateKey { key: &'static str, value: String },
    /// A key was not recognized.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Parse an attribute string (with or without leading `?`).
pub fn parse(input: &str) -> ParseResult {
    let (attributes, warnings) = parse::parse_attributes(input);
    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "attribute string produced warnings");
    }
    ParseResult {
        attributes,
        warnings,
    }
}
