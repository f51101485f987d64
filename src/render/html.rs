//! Markup (HTML) renderer.

use super::text::push_word;
use super::{TokenHandler, render};
use crate::error::Result;
use crate::rich_text::{Token, TokenKind};
use crate::util::escape_xml;

/// Open/close literals per token kind. EmptyLine is a self-contained break.
const TAG_TABLE: &[(TokenKind, &str, &str)] = &[
    (TokenKind::Strong, r#"<span class="b">"#, "</span>"),
    (TokenKind::Emphasis, r#"<span class="i">"#, "</span>"),
    (TokenKind::Style, r#"<span class="u">"#, "</span>"),
    (TokenKind::Cite, "<cite>", "</cite>"),
    (TokenKind::Epigraph, r#"<span class="epigraph">"#, "</span>"),
    (TokenKind::Paragraph, "<p>", "</p>"),
    (TokenKind::Code, r#"<span class="monospace">"#, "</span>"),
    (TokenKind::Title, r#"<div class="heading">"#, "</div>"),
    (TokenKind::EmptyLine, "<br/>", ""),
];

fn tags_for(kind: TokenKind) -> Option<(&'static str, &'static str)> {
    TAG_TABLE
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|&(_, open, close)| (open, close))
}

#[derive(Debug, Clone, Default)]
pub struct HtmlConfig {
    /// Escape XML special characters in words and hrefs.
    ///
    /// Off by default: text is emitted raw.
    pub escape_text: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    html: String,
    config: HtmlConfig,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HtmlConfig) -> Self {
        Self {
            html: String::new(),
            config,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    fn push_text(&mut self, text: &str) {
        if self.config.escape_text {
            push_word(&mut self.html, &escape_xml(text));
        } else {
            push_word(&mut self.html, text);
        }
    }
}

impl TokenHandler for HtmlRenderer {
    fn handle(&mut self, token: &Token, closing: bool) {
        match token {
            Token::Word(text) => self.push_text(text),
            Token::Link { .. } if closing => self.html.push_str("</a>"),
            Token::Link { href } => {
                let href = if self.config.escape_text {
                    escape_xml(href)
                } else {
                    href.clone()
                };
                self.html.push_str(&format!("<a href=\"{href}\">"));
            }
            token => {
                if let Some((open, close)) = tags_for(token.kind()) {
                    self.html.push_str(if closing { close } else { open });
                }
            }
        }
    }
}

pub fn to_html(tokens: &[Token]) -> Result<String> {
    to_html_with(tokens, HtmlConfig::default())
}

pub fn to_html_with(tokens: &[Token], config: HtmlConfig) -> Result<String> {
    Ok(render(HtmlRenderer::with_config(config), tokens)?.into_html())
}
