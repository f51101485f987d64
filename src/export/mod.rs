//! Export module for writing books to output formats.
//!
//! Provides the `Exporter` trait and format-specific implementations.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write + Seek` destination
//!
//! # Example
//!
//! ```no_run
//! use fb2epub::Book;
//! use fb2epub::export::{EpubExporter, Exporter};
//! use std::fs::File;
//!
//! let book = Book::open("input.fb2")?;
//! let mut file = File::create("output.epub")?;
//! EpubExporter::new().export(&book, &mut file)?;
//! # Ok::<(), fb2epub::Error>(())
//! ```

use std::io::{Seek, Write};

use crate::error::Result;
use crate::model::Book;

mod epub;
mod text;

pub use epub::{ChapterRef, EpubConfig, EpubExporter, build_toc};
pub use text::{TextConfig, TextExporter};

/// Trait for exporting books to specific formats.
///
/// Exporters hold their configuration, and the `export` method writes to any
/// `Write + Seek` destination:
/// - `std::fs::File` for disk output
/// - `std::io::Cursor<Vec<u8>>` for seekable in-memory output
pub trait Exporter {
    /// Export the book to the provided writer.
    fn export<W: Write + Seek>(&self, book: &Book, writer: &mut W) -> Result<()>;
}
