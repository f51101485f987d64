//! FictionBook 2 reader.
//!
//! Builds a [`Book`] from FB2 bytes:
//!
//! - [`element`]: owned XML tree with namespace-stripped tags
//! - [`tokenizer`]: markup subtree → rich-text tokens
//! - section, description and binary parsing on top of those
//!
//! # Example
//!
//! ```no_run
//! let book = fb2epub::read_fb2("book.fb2")?;
//! println!("{} sections", book.sections.len());
//! # Ok::<(), fb2epub::Error>(())
//! ```

mod binary;
mod description;
pub mod element;
mod section;
pub mod tokenizer;

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Book;
use crate::util::{content_hash, decode_text, extract_xml_encoding, strip_bom};

pub use binary::Binary;
pub use element::{Element, MarkupNode, parse_document};
pub use tokenizer::{Fb2Tokenizer, TagTable, Tokens};

/// Read an FB2 file from disk.
pub fn read_fb2<P: AsRef<Path>>(path: P) -> Result<Book> {
    let bytes = std::fs::read(path)?;
    parse_fb2(&bytes)
}

/// Parse FB2 bytes with the default tag table.
pub fn parse_fb2(bytes: &[u8]) -> Result<Book> {
    parse_fb2_with(bytes, TagTable::fb2())
}

/// Parse FB2 bytes, mapping inline tags through `table`.
pub fn parse_fb2_with(bytes: &[u8], table: TagTable) -> Result<Book> {
    let data = strip_bom(bytes);
    let content = decode_text(data, extract_xml_encoding(data));
    let root = parse_document(&content)?;

    if root.tag() != "FictionBook" {
        return Err(Error::InvalidFb2(format!(
            "expected <FictionBook> root, found <{}>",
            root.tag()
        )));
    }

    let mut tokenizer = Fb2Tokenizer::new(table);

    let title_info = root
        .find("description")
        .ok_or_else(|| Error::MissingElement("description".into()))?
        .find("title-info")
        .ok_or_else(|| Error::MissingElement("title-info".into()))?;
    let description = description::parse_description(title_info, &mut tokenizer)?;

    let sections = match root.find("body") {
        Some(body) => body
            .find_all("section")
            .map(|s| section::parse_section(s, &mut tokenizer))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let binaries = binary::parse_binaries(&root)
        .into_iter()
        .map(|b| (b.id.clone(), b))
        .collect();

    log::debug!(
        "Parsed FB2: {} top-level sections, {} diagnostics",
        sections.len(),
        tokenizer.diagnostics().len()
    );

    Ok(Book {
        identifier: content_hash(bytes),
        description,
        sections,
        binaries,
        diagnostics: tokenizer.into_diagnostics(),
    })
}
