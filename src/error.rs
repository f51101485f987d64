//! Error types for fb2epub operations.

use thiserror::Error;

use crate::rich_text::TokenKind;

/// Errors that can occur while reading, transforming, or writing a book.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid FB2: {0}")]
    InvalidFb2(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    /// A token was constructed with attributes that do not fit its kind.
    #[error("Invalid attribute for {kind:?} token: {reason}")]
    InvalidAttribute { kind: TokenKind, reason: String },

    /// A closing token arrived while no token was open.
    #[error("Closing token at position {position} has no open token to close")]
    StackUnderflow { position: usize },

    /// Depth grew by more than one level between consecutive flat sections.
    #[error("Section {index} jumps from depth {previous:?} to depth {depth}")]
    MalformedDepthSequence {
        index: usize,
        previous: Option<usize>,
        depth: usize,
    },

    #[error("Expected one artifact per section ({sections} sections, {artifacts} artifacts)")]
    ArtifactCountMismatch { sections: usize, artifacts: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal anomalies recorded while parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An element whose tag maps to no token kind. Its content was still tokenized.
    #[error("Unknown tag: {tag}")]
    UnknownTag { tag: String },
}
