//! FB2 markup → rich-text token stream.
//!
//! A node is emitted as its opening token (when its tag maps to a kind),
//! then its leading text, then each child in document order, then its
//! closing token (when the kind needs one), then its tail text. The walk uses
//! an explicit work stack of [`Visit`] entries instead of recursion, so the
//! depth of the document never reaches the call stack.

use std::collections::{HashMap, VecDeque};

use super::element::MarkupNode;
use crate::error::{Diagnostic, Error, Result};
use crate::rich_text::{RichText, Token, TokenKind, tokenize_text};

/// Mapping from tag names to token kinds.
#[derive(Debug, Clone)]
pub struct TagTable {
    kinds: HashMap<String, TokenKind>,
}

impl TagTable {
    /// An empty table; every tag is unknown.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// The FictionBook inline and block tags.
    pub fn fb2() -> Self {
        let mut table = Self::new();
        for (tag, kind) in [
            ("p", TokenKind::Paragraph),
            ("strong", TokenKind::Strong),
            ("emphasis", TokenKind::Emphasis),
            ("style", TokenKind::Style),
            ("epigraph", TokenKind::Epigraph),
            ("a", TokenKind::Link),
            ("code", TokenKind::Code),
            ("image", TokenKind::Image),
            ("strikethrough", TokenKind::Strikethrough),
            ("empty-line", TokenKind::EmptyLine),
            ("title", TokenKind::Title),
            ("subtitle", TokenKind::Title),
            ("cite", TokenKind::Cite),
        ] {
            table.kinds.insert(tag.to_string(), kind);
        }
        table
    }

    /// Map `tag` to `kind`.
    ///
    /// Word and Closing are not element kinds: a word is text, and a closing
    /// token is synthesized by the tokenizer. Both are rejected with
    /// [`Error::InvalidAttribute`].
    pub fn with(mut self, tag: impl Into<String>, kind: TokenKind) -> Result<Self> {
        let tag = tag.into();
        if matches!(kind, TokenKind::Word | TokenKind::Closing) {
            return Err(Error::InvalidAttribute {
                kind,
                reason: format!("tag <{tag}> cannot map to {kind:?}"),
            });
        }
        self.kinds.insert(tag, kind);
        Ok(self)
    }

    pub fn kind(&self, tag: &str) -> Option<TokenKind> {
        self.kinds.get(tag).copied()
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::fb2()
    }
}

/// Work-stack entry: a node still to be opened, or one whose children are done.
enum Visit<'a, N> {
    ToVisit(&'a N),
    ToClose { node: &'a N, closing: bool },
}

/// Lazy token stream over one markup subtree.
///
/// The iterator is finite and not restartable. Unknown tags are recorded in
/// [`Tokens::diagnostics`] and their content is still tokenized.
pub struct Tokens<'a, N> {
    table: &'a TagTable,
    stack: Vec<Visit<'a, N>>,
    pending: VecDeque<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, N: MarkupNode> Tokens<'a, N> {
    pub fn new(root: &'a N, table: &'a TagTable) -> Self {
        Self {
            table,
            stack: vec![Visit::ToVisit(root)],
            pending: VecDeque::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Anomalies seen so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn open(&mut self, node: &'a N) -> Result<()> {
        let token = self.node_to_token(node)?;
        let closing = token.as_ref().is_some_and(|t| t.kind().needs_closing());

        self.stack.push(Visit::ToClose { node, closing });
        self.stack
            .extend(node.children().iter().rev().map(Visit::ToVisit));

        self.pending.extend(token);
        self.pending.extend(tokenize_text(node.text()));
        Ok(())
    }

    fn close(&mut self, node: &'a N, closing: bool) {
        if closing {
            self.pending.push_back(Token::Closing);
        }
        self.pending.extend(tokenize_text(node.tail()));
    }

    fn node_to_token(&mut self, node: &N) -> Result<Option<Token>> {
        let tag = node.tag();
        let Some(kind) = self.table.kind(tag) else {
            log::warn!("Unknown tag: {tag}");
            self.diagnostics.push(Diagnostic::UnknownTag {
                tag: tag.to_string(),
            });
            return Ok(None);
        };

        let token = match kind {
            TokenKind::Image => Token::image(image_id(node)?),
            TokenKind::Link => Token::link(link_href(node, kind)?),
            TokenKind::Title => Token::title(title_size(tag))?,
            kind => Token::empty(kind).ok_or_else(|| Error::InvalidAttribute {
                kind,
                reason: format!("tag <{tag}> cannot supply attributes"),
            })?,
        };
        Ok(Some(token))
    }
}

impl<'a, N: MarkupNode> Iterator for Tokens<'a, N> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }

            match self.stack.pop()? {
                Visit::ToVisit(node) => {
                    if let Err(e) = self.open(node) {
                        self.stack.clear();
                        return Some(Err(e));
                    }
                }
                Visit::ToClose { node, closing } => self.close(node, closing),
            }
        }
    }
}

/// "title" is a top-level heading; every other heading-like tag is a subtitle.
fn title_size(tag: &str) -> u8 {
    if tag == "title" { 1 } else { 2 }
}

fn link_href<N: MarkupNode>(node: &N, kind: TokenKind) -> Result<String> {
    node.attribute("href")
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidAttribute {
            kind,
            reason: format!("<{}> has no href", node.tag()),
        })
}

/// Binary id referenced by an image node (`l:href="#id"` → `id`).
pub fn image_id<N: MarkupNode>(node: &N) -> Result<String> {
    let href = link_href(node, TokenKind::Image)?;
    Ok(href.strip_prefix('#').unwrap_or(&href).to_string())
}

/// Tokenizer that collects diagnostics across many subtrees.
#[derive(Debug, Default)]
pub struct Fb2Tokenizer {
    table: TagTable,
    diagnostics: Vec<Diagnostic>,
}

impl Fb2Tokenizer {
    pub fn new(table: TagTable) -> Self {
        Self {
            table,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize `node` and its subtree, including its tail text.
    pub fn tokenize<N: MarkupNode>(&mut self, node: &N) -> Result<RichText> {
        let mut tokens = Tokens::new(node, &self.table);
        let rich_text = tokens.by_ref().collect::<Result<RichText>>()?;
        self.diagnostics.extend(tokens.into_diagnostics());
        Ok(rich_text)
    }

    /// Tokenize the content of a container element without the element
    /// itself (e.g. `<annotation>`, which maps to no token).
    pub fn tokenize_children<N: MarkupNode>(&mut self, node: &N) -> Result<RichText> {
        let mut rich_text: RichText = tokenize_text(node.text()).into_iter().collect();
        for child in node.children() {
            rich_text.extend(self.tokenize(child)?);
        }
        Ok(rich_text)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb2::element::{Element, parse_document};

    fn tokenize(xml: &str) -> (RichText, Vec<Diagnostic>) {
        let root = parse_document(xml).unwrap();
        let mut tokenizer = Fb2Tokenizer::default();
        let tokens = tokenizer.tokenize(&root).unwrap();
        (tokens, tokenizer.into_diagnostics())
    }

    #[test]
    fn paragraph_with_strong() {
        let p = Element::new("p")
            .with_text("Hello ")
            .with_child(Element::new("strong").with_text("world"));
        let mut tokenizer = Fb2Tokenizer::default();
        let tokens = tokenizer.tokenize(&p).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Paragraph,
                Token::word("Hello "),
                Token::Strong,
                Token::word("world"),
                Token::Closing,
                Token::Closing,
            ]
        );
        assert!(tokenizer.diagnostics().is_empty());
    }

    #[test]
    fn tail_follows_the_closing_token() {
        let (tokens, _) = tokenize("<p>a<strong>b</strong>c<emphasis>d</emphasis>e</p>");
        assert_eq!(
            tokens,
            vec![
                Token::Paragraph,
                Token::word("a"),
                Token::Strong,
                Token::word("b"),
                Token::Closing,
                Token::word("c"),
                Token::Emphasis,
                Token::word("d"),
                Token::Closing,
                Token::word("e"),
                Token::Closing,
            ]
        );
    }

    #[test]
    fn leaf_kinds_are_not_closed() {
        let (tokens, _) = tokenize(
            r##"<section xmlns:l="http://www.w3.org/1999/xlink"><empty-line/><image l:href="#pic.png"/></section>"##,
        );
        assert_eq!(tokens, vec![Token::EmptyLine, Token::image("pic.png")]);
    }

    #[test]
    fn unknown_tags_keep_their_content() {
        let (tokens, diagnostics) = tokenize("<poem><v>line<strong>x</strong></v>after</poem>");
        assert_eq!(
            tokens,
            vec![
                Token::word("line"),
                Token::Strong,
                Token::word("x"),
                Token::Closing,
                Token::word("after"),
            ]
        );
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::UnknownTag { tag: "poem".into() },
                Diagnostic::UnknownTag { tag: "v".into() },
            ]
        );
    }

    #[test]
    fn title_sizes() {
        let (tokens, _) = tokenize("<title><p>T</p></title>");
        assert_eq!(tokens[0], Token::title(1).unwrap());
        let (tokens, _) = tokenize("<subtitle>S</subtitle>");
        assert_eq!(
            tokens,
            vec![Token::title(2).unwrap(), Token::word("S"), Token::Closing]
        );
    }

    #[test]
    fn links_keep_href_verbatim() {
        let (tokens, _) = tokenize(
            r##"<p xmlns:l="http://www.w3.org/1999/xlink">see <a l:href="#n1" type="note">1</a></p>"##,
        );
        assert_eq!(
            tokens,
            vec![
                Token::Paragraph,
                Token::word("see "),
                Token::link("#n1"),
                Token::word("1"),
                Token::Closing,
                Token::Closing,
            ]
        );
    }

    #[test]
    fn link_without_href_is_rejected() {
        let root = parse_document("<p><a>x</a></p>").unwrap();
        let result = Fb2Tokenizer::default().tokenize(&root);
        assert!(matches!(
            result,
            Err(Error::InvalidAttribute {
                kind: TokenKind::Link,
                ..
            })
        ));
    }

    #[test]
    fn whitespace_runs_produce_no_words() {
        let (tokens, _) = tokenize("<p>\n   <strong>  </strong>\n</p>");
        assert_eq!(
            tokens,
            vec![Token::Paragraph, Token::Strong, Token::Closing, Token::Closing]
        );
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut node = Element::new("emphasis").with_text("core");
        for _ in 0..50_000 {
            node = Element::new("strong").with_child(node);
        }
        let tokens = Fb2Tokenizer::default().tokenize(&node).unwrap();
        let closings = tokens.iter().filter(|t| **t == Token::Closing).count();
        assert_eq!(closings, 50_001);
        drop(node);
    }

    #[test]
    fn custom_table() {
        let table = TagTable::new().with("b", TokenKind::Strong).unwrap();
        let root = parse_document("<b>x</b>").unwrap();
        let tokens: Result<RichText> = Tokens::new(&root, &table).collect();
        assert_eq!(
            tokens.unwrap(),
            vec![Token::Strong, Token::word("x"), Token::Closing]
        );
    }

    #[test]
    fn table_rejects_non_element_kinds() {
        for kind in [TokenKind::Closing, TokenKind::Word] {
            let result = TagTable::new().with("x", kind);
            assert!(matches!(result, Err(Error::InvalidAttribute { kind: k, .. }) if k == kind));
        }

        // Every kind the table does accept tokenizes to a balanced stream.
        let table = TagTable::new()
            .with("p", TokenKind::Paragraph)
            .and_then(|t| t.with("x", TokenKind::EmptyLine))
            .unwrap();
        let root = parse_document("<p><x>a</x></p>").unwrap();
        let tokens: RichText = Tokens::new(&root, &table).collect::<Result<_>>().unwrap();
        assert_eq!(
            tokens,
            vec![Token::Paragraph, Token::EmptyLine, Token::word("a"), Token::Closing]
        );
        assert!(crate::render::to_plain_text(&tokens, true).is_ok());
    }
}
