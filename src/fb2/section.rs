//! `<section>` elements → [`Section`] tree.

use super::element::{Element, MarkupNode};
use super::tokenizer::{Fb2Tokenizer, image_id};
use crate::error::Result;
use crate::model::{Section, SectionHeader};

/// Parse a `<section>` and, recursively, its child sections.
///
/// Header layout: an optional `<title>`, any `<epigraph>`s, an optional
/// `<image>`, any `<annotation>`s, then the body. Body content (including
/// epigraphs and annotations) is only tokenized when the section has no
/// child sections.
pub(crate) fn parse_section(node: &Element, tokenizer: &mut Fb2Tokenizer) -> Result<Section> {
    let subsections = node
        .find_all("section")
        .map(|s| parse_section(s, tokenizer))
        .collect::<Result<Vec<_>>>()?;

    let mut children = node.children().iter().peekable();

    let title = match children.next_if(|c| c.tag() == "title") {
        Some(title) => tokenizer.tokenize(title)?,
        None => Vec::new(),
    };

    let mut epigraphs: Vec<&Element> = Vec::new();
    while let Some(epigraph) = children.next_if(|c| c.tag() == "epigraph") {
        epigraphs.push(epigraph);
    }

    let image = match children.next_if(|c| c.tag() == "image") {
        Some(image) => Some(image_id(image)?),
        None => None,
    };

    let mut annotations: Vec<&Element> = Vec::new();
    while let Some(annotation) = children.next_if(|c| c.tag() == "annotation") {
        annotations.push(annotation);
    }

    let mut contents = Vec::new();
    if subsections.is_empty() {
        for epigraph in epigraphs {
            contents.extend(tokenizer.tokenize(epigraph)?);
        }
        for annotation in annotations {
            contents.extend(tokenizer.tokenize_children(annotation)?);
        }
        for child in children {
            contents.extend(tokenizer.tokenize(child)?);
        }
    }

    Ok(Section {
        header: SectionHeader { title, image },
        contents,
        subsections,
    })
}
