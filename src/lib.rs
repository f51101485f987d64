//! # fb2epub
//!
//! A library for reading FictionBook 2 (FB2) books and converting them to
//! EPUB or plain text.
//!
//! ## Features
//!
//! - Flatten FB2 markup into a linear stream of rich-text [`Token`]s
//! - Render token streams to plain text or HTML through a stack-based
//!   [`StreamConsumer`]
//! - Flatten the section tree with depths and rebuild it as a navigation tree
//! - Export EPUB 2 with a nested NCX table of contents and embedded images
//!
//! ## Quick Start
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
//!
//! ## Working with Tokens
//!
//! ```
//! use fb2epub::{Token, to_html, to_plain_text};
//!
//! let tokens = vec![
//!     Token::Paragraph,
//!     Token::word("Hello "),
//!     Token::Strong,
//!     Token::word("world"),
//!     Token::Closing,
//!     Token::Closing,
//! ];
//!
//! assert_eq!(to_plain_text(&tokens, true)?, "Hello world \n");
//! assert_eq!(to_html(&tokens)?, r#"<p>Hello <span class="b">world </span></p>"#);
//! # Ok::<(), fb2epub::Error>(())
//! ```

pub mod error;
pub mod export;
pub mod fb2;
pub mod model;
pub mod render;
pub mod rich_text;
pub(crate) mod util;

pub use error::{Diagnostic, Error, Result};
pub use fb2::{Binary, parse_fb2, read_fb2};
pub use model::{
    Author, Book, Description, FlatSection, NavNode, NavValue, Section, SectionHeader,
    build_nav_tree, flatten_sections,
};
pub use render::{StreamConsumer, TokenHandler, to_html, to_plain_text};
pub use rich_text::{RichText, Token, TokenKind, needs_closing_token, tokenize_text};
pub use util::MediaFormat;
