//! Rich text as a flat stream of tokens.
//!
//! Inline content (titles, paragraphs, annotations) is represented as a
//! linear sequence of [`Token`]s. Span-like tokens (strong, paragraph, link,
//! ...) are opened by their own token and terminated by a kind-agnostic
//! [`Token::Closing`]; leaf tokens ([`NON_CLOSING`]) stand alone.
//!
//! A well-formed sequence closes every span-like token exactly once, after
//! everything nested inside it, so pairing is recovered purely by stack
//! order (see [`crate::render::StreamConsumer`]).

use crate::error::{Error, Result};

/// An ordered token sequence holding inline styled content.
pub type RichText = Vec<Token>;

/// The closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum TokenKind {
    Word,
    Strong,
    Emphasis,
    Style,
    Cite,
    Epigraph,
    Strikethrough,
    Paragraph,
    Link,
    Image,
    Code,
    Title,
    Closing,
    EmptyLine,
}

/// Kinds that never take a matching [`Token::Closing`].
pub const NON_CLOSING: [TokenKind; 3] = [TokenKind::Word, TokenKind::Image, TokenKind::EmptyLine];

impl TokenKind {
    /// Whether opening a token of this kind requires a later closing token.
    pub fn needs_closing(self) -> bool {
        !NON_CLOSING.contains(&self)
    }
}

/// Heading size of a title token, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct TitleSize(u8);

impl TitleSize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(size: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(Error::InvalidAttribute {
                kind: TokenKind::Title,
                reason: format!(
                    "size {size} is outside {}..={}",
                    Self::MIN,
                    Self::MAX
                ),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Attributes supplied to [`Token::make`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAttrs {
    None,
    Text(String),
    Href(String),
    Id(String),
    Size(u8),
}

/// A single element of the rich-text stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub enum Token {
    Word(String),
    Strong,
    Emphasis,
    Style,
    Cite,
    Epigraph,
    Strikethrough,
    Paragraph,
    Link { href: String },
    Image { id: String },
    Code,
    Title { size: TitleSize },
    Closing,
    EmptyLine,
}

impl Token {
    /// Build a token of `kind`, checking that `attrs` fit that kind.
    ///
    /// Word takes [`TokenAttrs::Text`], Link takes [`TokenAttrs::Href`],
    /// Image takes [`TokenAttrs::Id`] and Title takes [`TokenAttrs::Size`]
    /// in `1..=5`. Every other kind takes [`TokenAttrs::None`].
    pub fn make(kind: TokenKind, attrs: TokenAttrs) -> Result<Self> {
        let token = match (kind, attrs) {
            (TokenKind::Word, TokenAttrs::Text(text)) => Token::Word(text),
            (TokenKind::Link, TokenAttrs::Href(href)) => Token::Link { href },
            (TokenKind::Image, TokenAttrs::Id(id)) => Token::Image { id },
            (TokenKind::Title, TokenAttrs::Size(size)) => Token::Title {
                size: TitleSize::new(size)?,
            },
            (TokenKind::Strong, TokenAttrs::None) => Token::Strong,
            (TokenKind::Emphasis, TokenAttrs::None) => Token::Emphasis,
            (TokenKind::Style, TokenAttrs::None) => Token::Style,
            (TokenKind::Cite, TokenAttrs::None) => Token::Cite,
            (TokenKind::Epigraph, TokenAttrs::None) => Token::Epigraph,
            (TokenKind::Strikethrough, TokenAttrs::None) => Token::Strikethrough,
            (TokenKind::Paragraph, TokenAttrs::None) => Token::Paragraph,
            (TokenKind::Code, TokenAttrs::None) => Token::Code,
            (TokenKind::Closing, TokenAttrs::None) => Token::Closing,
            (TokenKind::EmptyLine, TokenAttrs::None) => Token::EmptyLine,
            (kind, attrs) => {
                return Err(Error::InvalidAttribute {
                    kind,
                    reason: format!("unexpected attributes {attrs:?}"),
                });
            }
        };
        Ok(token)
    }

    pub fn word(text: impl Into<String>) -> Self {
        Token::Word(text.into())
    }

    pub fn link(href: impl Into<String>) -> Self {
        Token::Link { href: href.into() }
    }

    pub fn image(id: impl Into<String>) -> Self {
        Token::Image { id: id.into() }
    }

    pub fn title(size: u8) -> Result<Self> {
        Ok(Token::Title {
            size: TitleSize::new(size)?,
        })
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Word(_) => TokenKind::Word,
            Token::Strong => TokenKind::Strong,
            Token::Emphasis => TokenKind::Emphasis,
            Token::Style => TokenKind::Style,
            Token::Cite => TokenKind::Cite,
            Token::Epigraph => TokenKind::Epigraph,
            Token::Strikethrough => TokenKind::Strikethrough,
            Token::Paragraph => TokenKind::Paragraph,
            Token::Link { .. } => TokenKind::Link,
            Token::Image { .. } => TokenKind::Image,
            Token::Code => TokenKind::Code,
            Token::Title { .. } => TokenKind::Title,
            Token::Closing => TokenKind::Closing,
            Token::EmptyLine => TokenKind::EmptyLine,
        }
    }

    /// Token for an attribute-less kind (Strong, Paragraph, ...).
    ///
    /// Returns `None` for kinds that carry attributes.
    pub fn empty(kind: TokenKind) -> Option<Self> {
        Token::make(kind, TokenAttrs::None).ok()
    }
}

/// Whether `token` must be matched by a later [`Token::Closing`].
pub fn needs_closing_token(token: &Token) -> bool {
    token.kind().needs_closing()
}

/// Turn a text run into at most one word token.
///
/// The whole run becomes a single [`Token::Word`] with its raw text, so the
/// original spacing between words survives. Missing, empty and
/// whitespace-only text yields nothing.
pub fn tokenize_text(text: Option<&str>) -> Option<Token> {
    match text {
        Some(text) if !text.trim().is_empty() => Some(Token::word(text)),
        _ => None,
    }
}
