//! `<description>/<title-info>` → [`Description`].

use super::element::{Element, MarkupNode};
use super::tokenizer::{Fb2Tokenizer, image_id};
use crate::error::Result;
use crate::model::{Author, Description};

pub(crate) fn parse_description(
    title_info: &Element,
    tokenizer: &mut Fb2Tokenizer,
) -> Result<Description> {
    let annotation = match title_info.find("annotation") {
        Some(annotation) => Some(tokenizer.tokenize_children(annotation)?),
        None => None,
    };

    let cover = match title_info
        .find("coverpage")
        .and_then(|cover| cover.find("image"))
    {
        Some(image) => Some(image_id(image)?),
        None => None,
    };

    Ok(Description {
        title: text_of(title_info, "book-title").unwrap_or_default(),
        authors: title_info.find_all("author").map(parse_author).collect(),
        genres: title_info
            .find_all("genre")
            .filter_map(|g| g.text())
            .map(|g| g.trim().to_string())
            .collect(),
        date: text_of(title_info, "date"),
        language: text_of(title_info, "lang"),
        cover,
        annotation,
        series: title_info
            .find_all("sequence")
            .chain(title_info.find_all("series"))
            .filter_map(|s| s.attribute("name"))
            .map(str::to_string)
            .collect(),
    })
}

fn parse_author(author: &Element) -> Author {
    Author {
        first_name: text_of(author, "first-name"),
        last_name: text_of(author, "last-name"),
        nickname: text_of(author, "nickname"),
    }
}

fn text_of(node: &Element, tag: &str) -> Option<String> {
    node.child_text(tag)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
