//! Section tree and its depth-annotated flattening.

use crate::rich_text::RichText;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionHeader {
    pub title: RichText,
    /// Binary id of the section image.
    pub image: Option<String>,
}

/// A section holds either tokenized contents (leaf) or subsections, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub header: SectionHeader,
    pub contents: RichText,
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn is_leaf(&self) -> bool {
        self.subsections.is_empty()
    }
}

/// A section reference paired with its depth (0 = top level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatSection<'a> {
    pub section: &'a Section,
    pub depth: usize,
}

/// Pre-order walk over a section forest: each section before its
/// subsections, siblings left to right.
pub struct FlatSections<'a> {
    stack: Vec<FlatSection<'a>>,
}

impl<'a> FlatSections<'a> {
    pub fn new(sections: &'a [Section]) -> Self {
        let mut walk = Self { stack: Vec::new() };
        walk.push_level(sections, 0);
        walk
    }

    fn push_level(&mut self, sections: &'a [Section], depth: usize) {
        self.stack
            .extend(sections.iter().rev().map(|section| FlatSection { section, depth }));
    }
}

impl<'a> Iterator for FlatSections<'a> {
    type Item = FlatSection<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let flat = self.stack.pop()?;
        self.push_level(&flat.section.subsections, flat.depth + 1);
        Some(flat)
    }
}

pub fn flatten_sections(sections: &[Section]) -> Vec<FlatSection<'_>> {
    FlatSections::new(sections).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::Token;

    fn named(name: &str, subsections: Vec<Section>) -> Section {
        Section {
            header: SectionHeader {
                title: vec![Token::word(name)],
                image: None,
            },
            contents: Vec::new(),
            subsections,
        }
    }

    fn name(section: &Section) -> &str {
        match &section.header.title[0] {
            Token::Word(text) => text,
            _ => unreachable!(),
        }
    }

    #[test]
    fn preorder_with_depths() {
        let tree = vec![named(
            "A",
            vec![named("B", vec![]), named("C", vec![named("D", vec![])])],
        )];
        let flat: Vec<_> = flatten_sections(&tree)
            .into_iter()
            .map(|f| (name(f.section), f.depth))
            .collect();
        assert_eq!(flat, vec![("A", 0), ("B", 1), ("C", 1), ("D", 2)]);
    }

    #[test]
    fn siblings_stay_in_document_order() {
        let tree = vec![
            named("1", vec![named("1.1", vec![named("1.1.1", vec![])])]),
            named("2", vec![]),
            named("3", vec![named("3.1", vec![]), named("3.2", vec![])]),
        ];
        let flat: Vec<_> = FlatSections::new(&tree)
            .map(|f| (name(f.section), f.depth))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("1", 0),
                ("1.1", 1),
                ("1.1.1", 2),
                ("2", 0),
                ("3", 0),
                ("3.1", 1),
                ("3.2", 1),
            ]
        );
    }

    #[test]
    fn empty_forest() {
        assert!(flatten_sections(&[]).is_empty());
    }

    #[test]
    fn flat_sections_reference_the_tree() {
        let tree = vec![named("A", vec![])];
        let flat = flatten_sections(&tree);
        assert!(std::ptr::eq(flat[0].section, &tree[0]));
    }
}
