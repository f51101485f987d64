//! Plain-text renderer.

use super::{TokenHandler, render};
use crate::error::Result;
use crate::rich_text::Token;

/// Collects word text, each followed by a separator space, and ends
/// paragraphs with a newline when line breaks are enabled. Everything else
/// is silent.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    text: String,
    line_breaks: bool,
}

impl PlainTextRenderer {
    pub fn new(line_breaks: bool) -> Self {
        Self {
            text: String::new(),
            line_breaks,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TokenHandler for PlainTextRenderer {
    fn handle(&mut self, token: &Token, closing: bool) {
        match token {
            Token::Word(text) => push_word(&mut self.text, text),
            Token::Paragraph if closing && self.line_breaks => self.text.push('\n'),
            _ => {}
        }
    }
}

/// Append a word and its separator space. A run that already ends in
/// whitespace is its own separator.
///
/// This intentionally differs from a literal "one trailing space per word"
/// rule: `"Hello "` stays `"Hello "` rather than becoming `"Hello  "`, and a
/// word ending in `\n` is not followed by a space.
pub(crate) fn push_word(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

pub fn to_plain_text(tokens: &[Token], line_breaks: bool) -> Result<String> {
    Ok(render(PlainTextRenderer::new(line_breaks), tokens)?.into_text())
}

/// Single-line display text for a title: no paragraph breaks, trimmed.
pub fn title_to_plain_text(title: &[Token]) -> Result<String> {
    let text = to_plain_text(title, false)?;
    Ok(text.replace('\n', " ").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn hello_world() -> Vec<Token> {
        vec![
            Token::Paragraph,
            Token::word("Hello "),
            Token::Strong,
            Token::word("world"),
            Token::Closing,
            Token::Closing,
        ]
    }

    #[test]
    fn paragraph_with_line_breaks() {
        assert_eq!(to_plain_text(&hello_world(), true).unwrap(), "Hello world \n");
    }

    #[test]
    fn paragraph_without_line_breaks() {
        assert_eq!(to_plain_text(&hello_world(), false).unwrap(), "Hello world ");
    }

    #[test]
    fn separator_is_not_doubled() {
        let tokens = vec![Token::word("a"), Token::word("b\n"), Token::word(" c")];
        assert_eq!(to_plain_text(&tokens, true).unwrap(), "a b\n c ");
    }

    #[test]
    fn word_ending_in_newline_gets_no_separator() {
        let mut out = String::new();
        push_word(&mut out, "line\n");
        assert_eq!(out, "line\n");

        push_word(&mut out, "next");
        assert_eq!(out, "line\nnext ");
    }

    #[test]
    fn only_words_and_paragraph_ends_produce_output() {
        let tokens = vec![
            Token::title(1).unwrap(),
            Token::link("#x"),
            Token::word("a"),
            Token::Closing,
            Token::EmptyLine,
            Token::image("i"),
            Token::Closing,
        ];
        assert_eq!(to_plain_text(&tokens, true).unwrap(), "a ");
    }

    #[test]
    fn title_text_is_single_line() {
        let title = vec![
            Token::title(1).unwrap(),
            Token::Paragraph,
            Token::word("Part"),
            Token::Closing,
            Token::Paragraph,
            Token::word("One"),
            Token::Closing,
            Token::Closing,
        ];
        assert_eq!(title_to_plain_text(&title).unwrap(), "Part One");
    }

    #[test]
    fn underflow_propagates() {
        let result = to_plain_text(&[Token::Closing], true);
        assert!(matches!(result, Err(Error::StackUnderflow { position: 0 })));
    }
}
