//! `<binary>` elements: base64 resources referenced by id.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::element::{Element, MarkupNode};
use crate::util::{MediaFormat, detect_media_format};

/// An embedded resource. The bytes are opaque; nothing here decodes images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    pub id: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Binary {
    pub fn format(&self) -> MediaFormat {
        detect_media_format(&self.content_type)
    }

    pub fn is_image(&self) -> bool {
        self.format().is_image()
    }
}

/// Collect every well-formed `<binary>` child of the document root.
///
/// Binaries without an id or with an undecodable payload are skipped.
pub(crate) fn parse_binaries(root: &Element) -> Vec<Binary> {
    root.find_all("binary").filter_map(parse_binary).collect()
}

fn parse_binary(node: &Element) -> Option<Binary> {
    let Some(id) = node.attribute("id") else {
        log::warn!("Skipping <binary> without id");
        return None;
    };

    let payload: String = node
        .text()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    match STANDARD.decode(payload.as_bytes()) {
        Ok(data) => Some(Binary {
            id: id.to_string(),
            content_type: node.attribute("content-type").unwrap_or_default().to_string(),
            data,
        }),
        Err(e) => {
            log::warn!("Skipping binary {id}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb2::element::parse_document;

    #[test]
    fn decodes_wrapped_payloads() {
        let root = parse_document(
            "<FictionBook>\
             <binary id=\"a.png\" content-type=\"image/png\">iVBO\n  Rw==</binary>\
             <binary id=\"bad\" content-type=\"image/jpeg\">!!!</binary>\
             <binary content-type=\"image/jpeg\">AAAA</binary>\
             </FictionBook>",
        )
        .unwrap();
        let binaries = parse_binaries(&root);
        assert_eq!(binaries.len(), 1);
        assert_eq!(binaries[0].id, "a.png");
        assert_eq!(binaries[0].data, vec![0x89, 0x50, 0x4E, 0x47]);
        assert!(binaries[0].is_image());
    }

    #[test]
    fn images_are_classified_by_content_type() {
        let root = parse_document(
            "<FictionBook>\
             <binary id=\"p\" content-type=\"application/octet-stream\">iVBORw==</binary>\
             <binary id=\"j\" content-type=\"image/jpeg\">AAAA</binary>\
             </FictionBook>",
        )
        .unwrap();
        let binaries = parse_binaries(&root);
        assert_eq!(binaries.len(), 2);
        // PNG magic bytes, but not declared as an image.
        assert_eq!(binaries[0].data, vec![0x89, 0x50, 0x4E, 0x47]);
        assert!(!binaries[0].is_image());
        assert_eq!(binaries[0].format(), MediaFormat::Binary);
        assert!(binaries[1].is_image());
    }
}
