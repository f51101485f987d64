//! Navigation tree (table of contents) rebuilt from flat sections.
//!
//! The flat list only carries depths, so parent/child/sibling relations are
//! inferred from depth transitions. A cursor tracks the most recently placed
//! node; each new node attaches to the nearest node on the cursor's ancestor
//! path whose depth is smaller than its own. Nodes live in an arena with
//! parent indices while the tree is being built and are moved into an owned
//! [`NavNode`] tree at the end.

use super::section::FlatSection;
use crate::error::{Error, Result};
use crate::render::text::title_to_plain_text;

/// What a navigation entry points at.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum NavValue<T> {
    /// Per-section artifact of a leaf section (e.g. a chapter file).
    Leaf(T),
    /// Label of a section that only groups subsections.
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct NavNode<T> {
    pub value: NavValue<T>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<NavNode<T>>,
}

impl<T> NavNode<T> {
    pub fn leaf(value: T) -> Self {
        Self {
            value: NavValue::Leaf(value),
            children: Vec::new(),
        }
    }

    pub fn group(label: impl Into<String>, children: Vec<NavNode<T>>) -> Self {
        Self {
            value: NavValue::Group(label.into()),
            children,
        }
    }

    /// First leaf artifact in pre-order, including this node.
    pub fn first_leaf(&self) -> Option<&T> {
        match &self.value {
            NavValue::Leaf(value) => Some(value),
            NavValue::Group(_) => self.children.iter().find_map(NavNode::first_leaf),
        }
    }

    /// Number of levels below this node (0 for a node without children).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<&NavNode<T>> = vec![self];
        loop {
            level = level.iter().flat_map(|&n| n.children.iter()).collect();
            if level.is_empty() {
                return height;
            }
            height += 1;
        }
    }
}

struct Slot<T> {
    value: NavValue<T>,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Build a navigation tree from flat sections and one artifact per section.
///
/// Leaf sections carry their artifact; sections with subsections become
/// groups labelled with their plain-text title. The returned root is a
/// synthetic group labelled `root_label`.
///
/// Depth may rise by exactly one per step (or start at 0), stay equal, or
/// drop by any amount. A larger rise is rejected with
/// [`Error::MalformedDepthSequence`].
pub fn build_nav_tree<T, I>(
    flat: &[FlatSection<'_>],
    artifacts: I,
    root_label: impl Into<String>,
) -> Result<NavNode<T>>
where
    I: IntoIterator<Item = T>,
{
    let artifacts: Vec<T> = artifacts.into_iter().collect();
    if artifacts.len() != flat.len() {
        return Err(Error::ArtifactCountMismatch {
            sections: flat.len(),
            artifacts: artifacts.len(),
        });
    }

    let mut slots: Vec<Slot<T>> = Vec::with_capacity(flat.len());
    let mut root_children: Vec<usize> = Vec::new();
    let mut cursor: Option<usize> = None;
    let mut prev_depth: Option<usize> = None;

    for (index, (flat_section, artifact)) in flat.iter().zip(artifacts).enumerate() {
        let depth = flat_section.depth;
        let expected_max = prev_depth.map_or(0, |p| p + 1);
        if depth > expected_max {
            return Err(Error::MalformedDepthSequence {
                index,
                previous: prev_depth,
                depth,
            });
        }

        let mut parent = cursor;
        while let Some(p) = parent
            && slots[p].depth >= depth
        {
            parent = slots[p].parent;
        }

        let section = flat_section.section;
        let value = if section.is_leaf() {
            NavValue::Leaf(artifact)
        } else {
            NavValue::Group(title_to_plain_text(&section.header.title)?)
        };

        let id = slots.len();
        slots.push(Slot {
            value,
            depth,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => slots[p].children.push(id),
            None => root_children.push(id),
        }

        cursor = Some(id);
        prev_depth = Some(depth);
    }

    // Children always have larger ids than their parents, so building in
    // reverse id order finishes every child before its parent.
    let mut built: Vec<Option<NavNode<T>>> = (0..slots.len()).map(|_| None).collect();
    for (id, slot) in slots.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[id] = Some(NavNode {
            value: slot.value,
            children,
        });
    }

    let children = root_children
        .iter()
        .filter_map(|&child| built[child].take())
        .collect();
    Ok(NavNode::group(root_label, children))
}
