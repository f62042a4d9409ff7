//! Error types for markdown conversion

use std::fmt;

/// Errors that can occur while parsing or serializing page content.
///
/// There are no recoverable variants here: missing link references are
/// logged and dropped during parsing instead of surfacing as errors, and
/// everything else indicates either input outside the supported dialect or
/// a bug in an upstream producer.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Input uses a Markdown/HTML construct outside the supported subset.
    /// Carries the offending source fragment for diagnosis.
    UnsupportedSyntax { construct: String, fragment: String },
    /// A raw HTML close tag did not match the open tag, or a tag was never
    /// closed.
    UnmatchedHtmlTag(String),
    /// Error during serialization
    SerializationError(String),
    /// A structural invariant that producers must uphold was violated;
    /// indicates a bug upstream rather than bad input.
    InvariantViolation(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnsupportedSyntax {
                construct,
                fragment,
            } => write!(f, "unsupported syntax ({construct}) in: {fragment}"),
            FormatError::UnmatchedHtmlTag(tag) => write!(f, "unmatched HTML tag: {tag}"),
            FormatError::SerializationError(msg) => write!(f, "serialization error: {msg}"),
            FormatError::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}
