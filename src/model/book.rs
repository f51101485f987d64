use std::collections::HashMap;
use std::path::Path;

use super::section::{FlatSection, Section, flatten_sections};
use crate::error::{Diagnostic, Result};
use crate::fb2::Binary;
use crate::rich_text::RichText;

/// A parsed book: metadata, the section tree and embedded resources.
///
/// The section tree is built once by the reader and only read afterwards;
/// flat lists and navigation trees borrow from it.
#[derive(Debug, Clone, Default)]
pub struct Book {
    /// SHA-1 of the source bytes.
    pub identifier: String,
    pub description: Description,
    pub sections: Vec<Section>,
    /// Embedded resources keyed by id.
    pub binaries: HashMap<String, Binary>,
    /// Non-fatal anomalies recorded while parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Book metadata from `<title-info>`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Description {
    pub title: String,
    pub authors: Vec<Author>,
    pub genres: Vec<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    /// Binary id of the cover image.
    pub cover: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip))]
    pub annotation: Option<RichText>,
    pub series: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Author {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
}

impl Book {
    /// Read an FB2 file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::fb2::read_fb2(path)
    }

    /// Parse FB2 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::fb2::parse_fb2(bytes)
    }

    /// Sections in document order with their depth.
    pub fn flat_sections(&self) -> Vec<FlatSection<'_>> {
        flatten_sections(&self.sections)
    }

    /// An embedded image by id, if the binary exists and is an image.
    pub fn image(&self, id: &str) -> Option<&Binary> {
        self.binaries.get(id).filter(|b| b.is_image())
    }

    /// Embedded images sorted by id.
    pub fn images(&self) -> Vec<&Binary> {
        let mut images: Vec<_> = self.binaries.values().filter(|b| b.is_image()).collect();
        images.sort_by(|a, b| a.id.cmp(&b.id));
        images
    }
}

impl Author {
    /// "First Last", falling back to the nickname.
    pub fn display_name(&self) -> Option<String> {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            Some(full)
        } else {
            self.nickname.clone()
        }
    }
}
