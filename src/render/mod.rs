//! Token stream consumption and rendering.
//!
//! [`StreamConsumer`] walks a token sequence with a stack of open tokens and
//! turns it into open/close/leaf events for a [`TokenHandler`]:
//!
//! - a [`Token::Closing`] pops the most recently opened token and reports it
//!   with `closing = true` (pairing is by stack order, not by kind)
//! - any other token is reported with `closing = false`, and pushed first
//!   when it needs a closing token
//!
//! Renderers are handlers:
//!
//! - [`text`]: plain-text extraction
//! - [`html`]: markup generation

pub mod html;
pub mod text;

use crate::error::{Error, Result};
use crate::rich_text::{Token, needs_closing_token};

pub use html::{HtmlConfig, HtmlRenderer, to_html, to_html_with};
pub use text::{PlainTextRenderer, title_to_plain_text, to_plain_text};

/// Receives one event per token from a [`StreamConsumer`].
pub trait TokenHandler {
    /// `closing` is true when `token` is being closed, false when it is
    /// opened or is a leaf.
    fn handle(&mut self, token: &Token, closing: bool);
}

/// Stack-based driver pairing closing markers with open tokens.
pub struct StreamConsumer<'t, H> {
    open: Vec<&'t Token>,
    handler: H,
    position: usize,
}

impl<'t, H: TokenHandler> StreamConsumer<'t, H> {
    pub fn new(handler: H) -> Self {
        Self {
            open: Vec::new(),
            handler,
            position: 0,
        }
    }

    /// Feed one token.
    ///
    /// Fails with [`Error::StackUnderflow`] when a closing token arrives and
    /// nothing is open.
    pub fn push(&mut self, token: &'t Token) -> Result<()> {
        let position = self.position;
        self.position += 1;

        if *token == Token::Closing {
            let opened = self
                .open
                .pop()
                .ok_or(Error::StackUnderflow { position })?;
            self.handler.handle(opened, true);
        } else {
            if needs_closing_token(token) {
                self.open.push(token);
            }
            self.handler.handle(token, false);
        }
        Ok(())
    }

    /// Feed a whole sequence, stopping at the first error.
    pub fn consume<I>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = &'t Token>,
    {
        tokens.into_iter().try_for_each(|token| self.push(token))
    }

    /// Tokens opened and not yet closed, outermost first.
    pub fn open_tokens(&self) -> &[&'t Token] {
        &self.open
    }

    pub fn is_balanced(&self) -> bool {
        self.open.is_empty()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Stop consuming and hand back the handler.
    ///
    /// Tokens still open are left unclosed; no events are synthesized for them.
    pub fn finish(self) -> H {
        if !self.open.is_empty() {
            log::debug!("Token stream ended with {} open tokens", self.open.len());
        }
        self.handler
    }
}

/// Run `tokens` through a fresh consumer and return the handler.
pub fn render<'t, H, I>(handler: H, tokens: I) -> Result<H>
where
    H: TokenHandler,
    I: IntoIterator<Item = &'t Token>,
{
    let mut consumer = StreamConsumer::new(handler);
    consumer.consume(tokens)?;
    Ok(consumer.finish())
}
