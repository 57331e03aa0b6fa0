//! Nested JSON representation of the outline.
//!
//! The persisted format is a top-level array of nodes:
//!
//! ```json
//! [
//!   {
//!     "title": "Chapter 1",
//!     "page_num": 1,
//!     "child_nodes": [
//!       { "title": "Section 1.1", "page_num": 2 }
//!     ]
//!   }
//! ]
//! ```
//!
//! Page numbers are 1-based. `child_nodes` is omitted for leaves and may be
//! omitted or `null` on input.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::store::OutlineStore;
use super::OutlineNode;
use crate::error::Result;
use crate::pages::PageStore;

/// One node of the nested JSON outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutlineNode {
    /// Display title
    pub title: String,
    /// Target page (1-based)
    pub page_num: i64,
    /// Nested entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_nodes: Option<Vec<JsonOutlineNode>>,
}

impl JsonOutlineNode {
    /// Create a leaf node.
    pub fn new(title: impl Into<String>, page_num: i64) -> Self {
        Self {
            title: title.into(),
            page_num,
            child_nodes: None,
        }
    }

    /// Add a child node.
    pub fn with_child(mut self, child: JsonOutlineNode) -> Self {
        self.child_nodes.get_or_insert_with(Vec::new).push(child);
        self
    }
}

/// Nest canonical nodes (0-based pages, parents before children).
///
/// Each node is placed by following its parent's recorded path of array
/// indices from the top-level array; nodes without a placed parent go to the
/// top level.
pub fn serialize_nodes(nodes: &[OutlineNode]) -> Vec<JsonOutlineNode> {
    let mut roots: Vec<JsonOutlineNode> = Vec::new();
    let mut paths: HashMap<u32, Vec<usize>> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let json_node = JsonOutlineNode::new(node.title.clone(), node.page_num as i64 + 1);

        let parent_path = node.parent_id.and_then(|parent_id| paths.get(&parent_id));
        let parent = parent_path.and_then(|path| locate_mut(&mut roots, path).map(|p| (path, p)));

        let path = match parent {
            Some((parent_path, parent)) => {
                let siblings = parent.child_nodes.get_or_insert_with(Vec::new);
                let mut path = parent_path.clone();
                path.push(siblings.len());
                siblings.push(json_node);
                path
            },
            None => {
                roots.push(json_node);
                vec![roots.len() - 1]
            },
        };
        paths.insert(node.id, path);
    }

    roots
}

/// Follow a path of indices from the top-level array down `child_nodes`.
fn locate_mut<'a>(roots: &'a mut [JsonOutlineNode], path: &[usize]) -> Option<&'a mut JsonOutlineNode> {
    let (&first, rest) = path.split_first()?;
    let mut current = roots.get_mut(first)?;
    for &index in rest {
        current = current.child_nodes.as_mut()?.get_mut(index)?;
    }
    Some(current)
}

/// Flatten nested JSON nodes into candidates (0-based pages).
///
/// Nodes are numbered 1, 2, … in pre-order. Page numbers are clamped to
/// `page_count`; a node whose page still falls below 1 is dropped along with
/// its children. The result is unvalidated and meant for the ingestion filter.
pub fn deserialize_nodes(json_nodes: &[JsonOutlineNode], page_count: usize) -> Vec<OutlineNode> {
    let mut candidates = Vec::new();
    let mut next_id = 0;
    flatten_json(json_nodes, None, page_count, &mut next_id, &mut candidates);
    candidates
}

fn flatten_json(
    json_nodes: &[JsonOutlineNode],
    parent_id: Option<u32>,
    page_count: usize,
    next_id: &mut u32,
    candidates: &mut Vec<OutlineNode>,
) {
    for json_node in json_nodes {
        let page_num = json_node.page_num.min(page_count as i64);
        if page_num < 1 {
            log::warn!(
                "Dropping outline entry '{}': page {} is outside a document with {} pages",
                json_node.title,
                json_node.page_num,
                page_count
            );
            continue;
        }

        *next_id += 1;
        let id = *next_id;
        candidates.push(OutlineNode::new(
            id,
            json_node.title.clone(),
            (page_num - 1) as usize,
            parent_id,
        ));

        if let Some(children) = &json_node.child_nodes {
            flatten_json(children, Some(id), page_count, next_id, candidates);
        }
    }
}

impl<P: PageStore> OutlineStore<P> {
    /// Export the outline as nested JSON nodes.
    pub fn to_json_nodes(&self) -> Vec<JsonOutlineNode> {
        serialize_nodes(&self.ordered_nodes())
    }

    /// Export the outline as a JSON string.
    ///
    /// Pretty-printed with two-space indentation unless
    /// [`OutlineOptions::pretty_json`](crate::config::OutlineOptions::pretty_json)
    /// is off.
    pub fn to_json(&self) -> Result<String> {
        let nodes = self.to_json_nodes();
        let json = if self.options().pretty_json {
            serde_json::to_string_pretty(&nodes)?
        } else {
            serde_json::to_string(&nodes)?
        };
        Ok(json)
    }

    /// Replace the outline with nested JSON nodes.
    pub fn load_json_nodes(&mut self, json_nodes: &[JsonOutlineNode]) {
        let candidates = deserialize_nodes(json_nodes, self.page_count());
        self.replace_with_candidates(&candidates);
    }

    /// Replace the outline with the contents of a JSON string.
    ///
    /// Malformed JSON fails with [`Error::Json`](crate::Error::Json) and leaves
    /// the outline unchanged.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let json_nodes: Vec<JsonOutlineNode> = serde_json::from_str(json)?;
        self.load_json_nodes(&json_nodes);
        Ok(())
    }

    /// Write the outline to a JSON file.
    pub fn export_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Exported {} outline entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Replace the outline with the contents of a JSON file.
    pub fn import_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn node(id: u32, title: &str, page_num: usize, parent_id: Option<u32>) -> OutlineNode {
        OutlineNode::new(id, title, page_num, parent_id)
    }

    #[test]
    fn test_serialize_nested() {
        let nodes = vec![
            node(1, "Ch.1", 0, None),
            node(2, "Sec.1.1", 1, Some(1)),
            node(3, "Sec.1.1.a", 1, Some(2)),
            node(4, "Sec.1.2", 2, Some(1)),
            node(5, "Ch.2", 4, None),
        ];

        let expected = vec![
            JsonOutlineNode::new("Ch.1", 1)
                .with_child(
                    JsonOutlineNode::new("Sec.1.1", 2).with_child(JsonOutlineNode::new("Sec.1.1.a", 2)),
                )
                .with_child(JsonOutlineNode::new("Sec.1.2", 3)),
            JsonOutlineNode::new("Ch.2", 5),
        ];

        assert_eq!(serialize_nodes(&nodes), expected);
    }

    #[test]
    fn test_serialize_unplaced_parent_goes_top_level() {
        let nodes = vec![node(1, "Orphan", 0, Some(9))];
        assert_eq!(serialize_nodes(&nodes), vec![JsonOutlineNode::new("Orphan", 1)]);
    }

    #[test]
    fn test_leaves_omit_child_nodes() {
        let json = serde_json::to_string(&serialize_nodes(&[node(1, "A", 0, None)])).unwrap();
        assert_eq!(json, r#"[{"title":"A","page_num":1}]"#);
    }

    #[test]
    fn test_deserialize_preorder_ids() {
        let json_nodes = vec![
            JsonOutlineNode::new("A", 1).with_child(JsonOutlineNode::new("A.1", 2)),
            JsonOutlineNode::new("B", 3),
        ];

        assert_eq!(
            deserialize_nodes(&json_nodes, 10),
            vec![node(1, "A", 0, None), node(2, "A.1", 1, Some(1)), node(3, "B", 2, None)]
        );
    }

    #[test]
    fn test_deserialize_clamps_to_page_count() {
        let json_nodes = vec![JsonOutlineNode::new("Far away", 99)];
        assert_eq!(deserialize_nodes(&json_nodes, 4), vec![node(1, "Far away", 3, None)]);
    }

    #[test]
    fn test_deserialize_drops_non_positive_pages() {
        let json_nodes = vec![
            JsonOutlineNode::new("Zero", 0).with_child(JsonOutlineNode::new("Child", 2)),
            JsonOutlineNode::new("Ok", 1),
        ];

        assert_eq!(deserialize_nodes(&json_nodes, 4), vec![node(1, "Ok", 0, None)]);
        assert!(deserialize_nodes(&json_nodes, 0).is_empty());
    }

    #[test]
    fn test_null_child_nodes_accepted() {
        let json_nodes: Vec<JsonOutlineNode> =
            serde_json::from_str(r#"[{"title":"A","page_num":1,"child_nodes":null}]"#).unwrap();
        assert_eq!(json_nodes, vec![JsonOutlineNode::new("A", 1)]);
    }

    #[test]
    fn test_store_load_json_drops_empty_title() {
        let mut store = OutlineStore::new(10);
        store
            .load_json(r#"[{"title":"A","page_num":1,"child_nodes":[{"title":"","page_num":1}]}]"#)
            .unwrap();

        assert_eq!(store.get_all(), vec![node(1, "A", 1, None)]);
    }

    #[test]
    fn test_store_load_json_malformed_keeps_outline() {
        let mut store = OutlineStore::new(10);
        store.insert("Keep me", 1, None).unwrap();

        let result = store.load_json(r#"[{"title":"A"}"#);
        assert!(matches!(result, Err(Error::Json(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_to_json_pretty() {
        let mut store = OutlineStore::new(10);
        store.insert("Ch.1", 1, None).unwrap();
        let json = store.to_json().unwrap();
        assert!(json.contains("\n  {"));
        assert!(json.contains("\"page_num\": 1"));
    }

    #[test]
    fn test_store_to_json_compact() {
        let options = crate::config::OutlineOptions::default().with_pretty_json(false);
        let mut store = OutlineStore::with_options(10, options);
        store.insert("Ch.1", 1, None).unwrap();
        assert_eq!(store.to_json().unwrap(), r#"[{"title":"Ch.1","page_num":1}]"#);
    }

    #[test]
    fn test_store_export_after_same_page_reparent() {
        let mut store = OutlineStore::new(10);
        store.insert("A", 1, None).unwrap();
        store.insert("B", 1, None).unwrap();
        store.update(1, crate::outline::OutlineUpdate::new().parent(2)).unwrap();

        assert_eq!(
            store.to_json_nodes(),
            vec![JsonOutlineNode::new("B", 1).with_child(JsonOutlineNode::new("A", 1))]
        );
    }
}
