//! Structural properties of tokenization, stream consumption and
//! navigation tree reconstruction.

use fb2epub::fb2::{Element, Fb2Tokenizer, MarkupNode};
use fb2epub::render::title_to_plain_text;
use fb2epub::rich_text::NON_CLOSING;
use fb2epub::{
    NavNode, Section, SectionHeader, StreamConsumer, Token, TokenHandler, build_nav_tree,
    flatten_sections, needs_closing_token,
};
use proptest::prelude::*;

const TAGS: &[&str] = &[
    "p",
    "strong",
    "emphasis",
    "style",
    "cite",
    "code",
    "strikethrough",
    "epigraph",
    "empty-line",
    "image",
    "a",
    "title",
    "subtitle",
];

fn text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z ]{0,6}")
}

fn make_element(
    tag: &str,
    text: Option<String>,
    tail: Option<String>,
    children: Vec<Element>,
) -> Element {
    let mut element = Element::new(tag).with_attribute("href", "#target");
    if let Some(text) = text {
        element = element.with_text(text);
    }
    if let Some(tail) = tail {
        element = element.with_tail(tail);
    }
    children
        .into_iter()
        .fold(element, |element, child| element.with_child(child))
}

fn element() -> impl Strategy<Value = Element> {
    let leaf = (prop::sample::select(TAGS), text(), text())
        .prop_map(|(tag, text, tail)| make_element(tag, text, tail, Vec::new()));
    leaf.prop_recursive(5, 48, 4, |inner| {
        (
            prop::sample::select(TAGS),
            text(),
            text(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, text, tail, children)| make_element(tag, text, tail, children))
    })
}

fn count_closing_elements(element: &Element) -> usize {
    let own = usize::from(!matches!(element.tag(), "empty-line" | "image"));
    own + element
        .children()
        .iter()
        .map(count_closing_elements)
        .sum::<usize>()
}

fn section(title: String, subsections: Vec<Section>) -> Section {
    let contents = if subsections.is_empty() {
        vec![Token::Paragraph, Token::word("body"), Token::Closing]
    } else {
        Vec::new()
    };
    Section {
        header: SectionHeader {
            title: vec![Token::Paragraph, Token::word(title), Token::Closing],
            image: None,
        },
        contents,
        subsections,
    }
}

fn sections() -> impl Strategy<Value = Vec<Section>> {
    let leaf = "[A-Z][a-z]{0,5}".prop_map(|title| section(title, Vec::new()));
    let tree = leaf.prop_recursive(5, 40, 4, |inner| {
        ("[A-Z][a-z]{0,5}", prop::collection::vec(inner, 0..4))
            .prop_map(|(title, children)| section(title, children))
    });
    prop::collection::vec(tree, 0..4)
}

/// Navigation tree built straight from the section tree, numbering leaves
/// by their pre-order position.
fn direct_nav(section: &Section, next: &mut usize) -> NavNode<usize> {
    let id = *next;
    *next += 1;
    if section.is_leaf() {
        NavNode::leaf(id)
    } else {
        let label = title_to_plain_text(&section.header.title).unwrap();
        let children = section
            .subsections
            .iter()
            .map(|s| direct_nav(s, next))
            .collect();
        NavNode::group(label, children)
    }
}

struct Depth {
    max: usize,
    current: usize,
}

impl TokenHandler for Depth {
    fn handle(&mut self, token: &Token, closing: bool) {
        if closing {
            self.current -= 1;
        } else if needs_closing_token(token) {
            self.current += 1;
            self.max = self.max.max(self.current);
        }
    }
}

proptest! {
    #[test]
    fn prop_tokens_are_balanced(root in element()) {
        let tokens = Fb2Tokenizer::default().tokenize(&root).unwrap();

        let closings = tokens.iter().filter(|t| **t == Token::Closing).count();
        let openers = tokens
            .iter()
            .filter(|t| **t != Token::Closing && needs_closing_token(t))
            .count();
        prop_assert_eq!(closings, openers);
        prop_assert_eq!(closings, count_closing_elements(&root));

        let mut consumer = StreamConsumer::new(Depth { max: 0, current: 0 });
        for token in &tokens {
            consumer.push(token).unwrap();
            prop_assert!(
                consumer
                    .open_tokens()
                    .iter()
                    .all(|t| !NON_CLOSING.contains(&t.kind()))
            );
        }
        prop_assert!(consumer.is_balanced());
        prop_assert_eq!(consumer.finish().current, 0);
    }

    #[test]
    fn prop_flatten_then_rebuild_matches_tree(tree in sections()) {
        let flat = flatten_sections(&tree);

        let mut next = 0;
        let expected: Vec<NavNode<usize>> = tree.iter().map(|s| direct_nav(s, &mut next)).collect();
        prop_assert_eq!(next, flat.len());

        let rebuilt = build_nav_tree(&flat, 0..flat.len(), "Book").unwrap();
        prop_assert_eq!(rebuilt, NavNode::group("Book", expected));
    }

    #[test]
    fn prop_flat_depths_rise_by_at_most_one(tree in sections()) {
        let flat = flatten_sections(&tree);
        let mut previous: Option<usize> = None;
        for entry in &flat {
            prop_assert!(entry.depth <= previous.map_or(0, |p| p + 1));
            previous = Some(entry.depth);
        }
    }
}
