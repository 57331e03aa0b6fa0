//! Translation between the canonical store and a document's native outline.

use std::collections::{HashMap, HashSet};

use super::store::OutlineStore;
use super::OutlineNode;
use crate::config::OutlineOptions;
use crate::error::{Error, Result};
use crate::native::{Destination, NativeOutlineItem, OutlineSink, OutlineSource};
use crate::object::ObjectRef;
use crate::pages::PageStore;

/// Flatten a native outline tree into candidates (0-based pages).
///
/// Entries are visited in pre-order and kept entries are numbered 1, 2, …. An
/// entry without a title, or whose destination does not resolve to a page in
/// `page_refs`, is dropped; its children are attached to the nearest kept
/// ancestor instead.
pub fn extract_candidates(items: &[NativeOutlineItem], page_refs: &[ObjectRef]) -> Vec<OutlineNode> {
    let mut page_index: HashMap<ObjectRef, usize> = HashMap::with_capacity(page_refs.len());
    for (index, page_ref) in page_refs.iter().enumerate() {
        page_index.entry(*page_ref).or_insert(index);
    }

    let mut candidates = Vec::new();
    let mut next_id = 0;
    flatten_native(items, None, &page_index, &mut next_id, &mut candidates);
    candidates
}

fn flatten_native(
    items: &[NativeOutlineItem],
    parent_id: Option<u32>,
    page_index: &HashMap<ObjectRef, usize>,
    next_id: &mut u32,
    candidates: &mut Vec<OutlineNode>,
) {
    for item in items {
        let kept_id = match resolve_entry(item, page_index) {
            Ok((title, page_num)) => {
                *next_id += 1;
                candidates.push(OutlineNode::new(*next_id, title, page_num, parent_id));
                Some(*next_id)
            },
            Err(reason) => {
                log::debug!(
                    "Skipping outline entry {:?}: {}",
                    item.title.as_deref().unwrap_or(""),
                    reason
                );
                None
            },
        };

        flatten_native(&item.children, kept_id.or(parent_id), page_index, next_id, candidates);
    }
}

/// Title and page index of a native entry, or the reason it cannot be kept.
fn resolve_entry<'a>(
    item: &'a NativeOutlineItem,
    page_index: &HashMap<ObjectRef, usize>,
) -> std::result::Result<(&'a str, usize), &'static str> {
    let title = item.title.as_deref().ok_or("missing title")?;
    match &item.dest {
        Some(Destination::Page(page_ref)) => page_index
            .get(page_ref)
            .map(|&index| (title, index))
            .ok_or("page not in document"),
        Some(Destination::Named(_)) => Err("unresolved named destination"),
        Some(Destination::External(_)) => Err("external link"),
        None => Err("no destination"),
    }
}

/// Emit canonical nodes into a native outline, parents before children.
///
/// Nodes are emitted in ascending id order; each node is anchored under the
/// handle returned for its parent.
///
/// # Errors
///
/// - [`Error::InvalidRange`] if any node targets a page at or beyond
///   `page_count`
/// - [`Error::InvalidHierarchy`] if a parent id names no node with a smaller
///   id
///
/// Both checks run before the first entry is emitted.
pub fn emit_outline<S: OutlineSink>(nodes: &[OutlineNode], page_count: usize, sink: &mut S) -> Result<()> {
    if let Some(node) = nodes.iter().find(|n| n.page_num >= page_count) {
        return Err(Error::InvalidRange {
            page: node.page_num + 1,
            page_count,
        });
    }

    let ids: HashSet<u32> = nodes.iter().map(|n| n.id).collect();
    if let Some(node) = nodes
        .iter()
        .find(|n| n.parent_id.is_some_and(|p| p >= n.id || !ids.contains(&p)))
    {
        return Err(Error::InvalidHierarchy(format!(
            "outline entry {} does not follow its parent {}",
            node.id,
            node.parent_id.unwrap_or_default()
        )));
    }

    let mut ordered: Vec<&OutlineNode> = nodes.iter().collect();
    ordered.sort_by_key(|n| n.id);

    let mut handles: HashMap<u32, S::Handle> = HashMap::with_capacity(ordered.len());
    for node in ordered {
        let parent = node.parent_id.and_then(|parent_id| handles.get(&parent_id));
        let handle = sink.add_outline_entry(&node.title, node.page_num, parent)?;
        handles.insert(node.id, handle);
    }

    Ok(())
}

impl<P: PageStore> OutlineStore<P> {
    /// Read a document's outline into a new store.
    pub fn from_source<S: OutlineSource>(source: &mut S, pages: P, options: OutlineOptions) -> Result<Self> {
        let mut store = Self::with_options(pages, options);
        store.load_from_source(source)?;
        Ok(store)
    }

    /// Replace the outline with the one stored in a document.
    ///
    /// Fails without touching the store if the document cannot be read.
    pub fn load_from_source<S: OutlineSource>(&mut self, source: &mut S) -> Result<()> {
        let items = source.native_outline(self.options())?;
        let page_refs = source.page_refs()?;
        let candidates = extract_candidates(&items, &page_refs);
        self.replace_with_candidates(&candidates);
        Ok(())
    }

    /// Emit the outline into a document codec.
    pub fn save<S: OutlineSink>(&self, sink: &mut S) -> Result<()> {
        emit_outline(&self.ordered_nodes(), self.page_count(), sink)
    }
}
