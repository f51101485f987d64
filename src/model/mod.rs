//! Core data model.
//!
//! This module contains:
//! - Book metadata and the parsed book handle
//! - The section tree and its depth-annotated flattening
//! - Navigation trees rebuilt from flat sections

mod book;
mod nav;
mod section;

pub use crate::fb2::Binary;
pub use book::{Author, Book, Description};
pub use nav::{NavNode, NavValue, build_nav_tree};
pub use section::{FlatSection, FlatSections, Section, SectionHeader, flatten_sections};
