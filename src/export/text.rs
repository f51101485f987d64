//! Plain-text exporter.
//!
//! Writes every section in flat order: its title on one line, a blank line,
//! then the section body with one line per paragraph.

use std::io::{Seek, Write};

use super::Exporter;
use crate::error::Result;
use crate::model::Book;
use crate::render::{title_to_plain_text, to_plain_text};

/// Configuration for plain-text export.
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// End each paragraph with a newline.
    pub line_breaks: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { line_breaks: true }
    }
}

/// Exporter for plain-text output.
#[derive(Debug, Clone, Default)]
pub struct TextExporter {
    config: TextConfig,
}

impl TextExporter {
    /// Create a new TextExporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: TextConfig) -> Self {
        self.config = config;
        self
    }
}

impl Exporter for TextExporter {
    fn export<W: Write + Seek>(&self, book: &Book, writer: &mut W) -> Result<()> {
        if !book.description.title.is_empty() {
            writeln!(writer, "{}\n", book.description.title)?;
        }

        for flat in book.flat_sections() {
            let section = flat.section;
            let title = title_to_plain_text(&section.header.title)?;
            if !title.is_empty() {
                writeln!(writer, "{title}\n")?;
            }

            let body = to_plain_text(&section.contents, self.config.line_breaks)?;
            if !body.is_empty() {
                writer.write_all(body.as_bytes())?;
                if !body.ends_with('\n') {
                    writeln!(writer)?;
                }
                writeln!(writer)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}
