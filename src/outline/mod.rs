//! Editable document outline (bookmarks).
//!
//! The outline is kept as a flat arena of [`OutlineNode`]s linked by integer
//! parent ids. Every hierarchy that enters the store, whether read from a
//! document or imported from JSON, goes through the same two steps:
//!
//! ```text
//! candidates ──► filter_candidates ──► reindex ──► OutlineStore
//! ```
//!
//! After reindexing the store holds the canonical form:
//!
//! - ids are dense, `1..=N`
//! - a parent's page never exceeds its children's pages
//! - ascending id order is ascending page order, ties kept in prior order
//!
//! Ids are a view recomputed on every structural change. Do not hold on to an
//! id across a call that inserts, removes, or imports nodes.

mod adapter;
mod filter;
mod json;
mod reindex;
mod sanitize;
mod store;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use adapter::{emit_outline, extract_candidates};
pub use filter::filter_candidates;
pub use json::{deserialize_nodes, serialize_nodes, JsonOutlineNode};
pub use reindex::{reindex, reindex_tracked};
pub use sanitize::sanitize_title;
pub use store::{OutlineStore, OutlineUpdate};

/// A single outline entry in flat form.
///
/// Inside the store `page_num` is a 0-based page index. Nodes handed out by
/// [`OutlineStore`] accessors carry 1-based page numbers instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Node id, unique within a store
    pub id: u32,
    /// Display title
    pub title: String,
    /// Target page
    pub page_num: usize,
    /// Id of the enclosing node, `None` for top-level entries
    pub parent_id: Option<u32>,
}

impl OutlineNode {
    /// Create a new outline node.
    pub fn new(id: u32, title: impl Into<String>, page_num: usize, parent_id: Option<u32>) -> Self {
        Self {
            id,
            title: title.into(),
            page_num,
            parent_id,
        }
    }

    /// Whether this node is a top-level entry.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Copy of this node with a 1-based page number.
    pub(crate) fn to_external(&self) -> Self {
        Self {
            page_num: self.page_num + 1,
            ..self.clone()
        }
    }
}

/// Map each parent id to the positions of its direct children, in slice order.
pub(crate) fn children_index(nodes: &[OutlineNode]) -> HashMap<u32, Vec<usize>> {
    let mut index: HashMap<u32, Vec<usize>> = HashMap::new();
    for (position, node) in nodes.iter().enumerate() {
        if let Some(parent_id) = node.parent_id {
            index.entry(parent_id).or_default().push(position);
        }
    }
    index
}
