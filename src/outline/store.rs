//! The canonical outline store and its editing operations.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use super::filter::filter_candidates;
use super::reindex::{reindex, reindex_tracked};
use super::sanitize::sanitize_title;
use super::{children_index, OutlineNode};
use crate::config::OutlineOptions;
use crate::error::{Error, Result};
use crate::pages::PageStore;

/// Changes applied by [`OutlineStore::update`].
///
/// Fields left as `None` keep the node's current value.
///
/// # Example
///
/// ```
/// use pdf_outline::outline::OutlineUpdate;
///
/// let changes = OutlineUpdate::new().title("Appendix").page(12).detach();
/// assert_eq!(changes.parent_id, Some(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineUpdate {
    /// New title
    pub title: Option<String>,
    /// New target page (1-based)
    pub page_num: Option<usize>,
    /// New parent: `Some(Some(id))` moves under `id`, `Some(None)` makes a root
    pub parent_id: Option<Option<u32>>,
}

impl OutlineUpdate {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the target page (1-based).
    pub fn page(mut self, page_num: usize) -> Self {
        self.page_num = Some(page_num);
        self
    }

    /// Move the node under another node.
    pub fn parent(mut self, parent_id: u32) -> Self {
        self.parent_id = Some(Some(parent_id));
        self
    }

    /// Make the node a top-level entry.
    pub fn detach(mut self) -> Self {
        self.parent_id = Some(None);
        self
    }
}

/// Editable outline of one document.
///
/// Holds the canonical flat node list (0-based pages) next to the page store
/// that bounds it. Accessors hand out copies with 1-based page numbers.
///
/// # Example
///
/// ```
/// use pdf_outline::outline::OutlineStore;
///
/// let mut store = OutlineStore::new(10);
/// let chapter = store.insert("Chapter 1", 1, None)?;
/// store.insert("Section 1.1", 2, Some(chapter.id))?;
/// store.insert("Chapter 2", 5, None)?;
///
/// let pages: Vec<usize> = store.get_all().iter().map(|n| n.page_num).collect();
/// assert_eq!(pages, vec![1, 2, 5]);
///
/// store.remove(chapter.id)?;
/// assert_eq!(store.get(1)?.title, "Chapter 2");
/// # Ok::<(), pdf_outline::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OutlineStore<P: PageStore = usize> {
    pages: P,
    nodes: Vec<OutlineNode>,
    options: OutlineOptions,
}

impl<P: PageStore> OutlineStore<P> {
    /// Create an empty outline over a page store.
    pub fn new(pages: P) -> Self {
        Self::with_options(pages, OutlineOptions::default())
    }

    /// Create an empty outline with custom options.
    pub fn with_options(pages: P, options: OutlineOptions) -> Self {
        Self {
            pages,
            nodes: Vec::new(),
            options,
        }
    }

    /// Build an outline from unvalidated candidates (0-based pages).
    ///
    /// Candidates go through the ingestion filter and the reindexer.
    pub fn from_candidates(pages: P, candidates: &[OutlineNode], options: OutlineOptions) -> Self {
        let mut store = Self::with_options(pages, options);
        store.replace_with_candidates(candidates);
        store
    }

    /// Replace the whole outline with the valid part of `candidates`.
    pub(crate) fn replace_with_candidates(&mut self, candidates: &[OutlineNode]) {
        self.nodes = reindex(&filter_candidates(candidates));
        log::info!(
            "Outline replaced: {} of {} candidate entries kept",
            self.nodes.len(),
            candidates.len()
        );
    }

    /// Processing options.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// The page store.
    pub fn pages(&self) -> &P {
        &self.pages
    }

    /// The page store, mutably.
    pub fn pages_mut(&mut self) -> &mut P {
        &mut self.pages
    }

    /// Current page count of the document.
    pub fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    /// Number of outline entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The canonical nodes with 0-based page numbers, in id order.
    pub fn nodes(&self) -> &[OutlineNode] {
        &self.nodes
    }

    /// The nodes with every parent ahead of its children, as they are
    /// exported and saved.
    ///
    /// Differs from [`nodes`](Self::nodes) only after updates made without
    /// [`OutlineOptions::reindex_on_update`].
    pub(crate) fn ordered_nodes(&self) -> Cow<'_, [OutlineNode]> {
        let in_order = self.nodes.windows(2).all(|w| w[0].page_num <= w[1].page_num)
            && self.nodes.iter().all(|n| n.parent_id.map_or(true, |p| p < n.id));
        if in_order {
            Cow::Borrowed(&self.nodes)
        } else {
            Cow::Owned(reindex(&self.nodes))
        }
    }

    /// All nodes with 1-based page numbers, in id order.
    pub fn get_all(&self) -> Vec<OutlineNode> {
        self.nodes.iter().map(OutlineNode::to_external).collect()
    }

    /// Get one node (1-based page number).
    pub fn get(&self, id: u32) -> Result<OutlineNode> {
        self.find(id)
            .map(OutlineNode::to_external)
            .ok_or(Error::NotFound(id))
    }

    /// Direct children of a node (1-based page numbers), in id order.
    pub fn children(&self, id: u32) -> Result<Vec<OutlineNode>> {
        if self.find(id).is_none() {
            return Err(Error::NotFound(id));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .map(OutlineNode::to_external)
            .collect())
    }

    /// Insert a new entry and return it as stored after reindexing.
    ///
    /// `page_num` is 1-based. The entry lands after every existing entry on the
    /// same or an earlier page and before every entry on a later page.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyTitle`] if the title has no printable content
    /// - [`Error::InvalidRange`] if `page_num` is outside `1..=page_count`
    /// - [`Error::NotFound`] if `parent_id` names no node
    /// - [`Error::InvalidHierarchy`] if the parent targets a later page
    pub fn insert(
        &mut self,
        title: &str,
        page_num: usize,
        parent_id: Option<u32>,
    ) -> Result<OutlineNode> {
        let title = sanitize_title(title);
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        let page_index = self.check_page(page_num)?;
        if let Some(parent_id) = parent_id {
            let parent = self.find(parent_id).ok_or(Error::NotFound(parent_id))?;
            check_parent_page(parent, page_index)?;
        }

        // Updates may have left ids out of page order; the splice needs it back
        let (base, parent_id) = if self.nodes.windows(2).all(|w| w[0].page_num <= w[1].page_num) {
            (self.nodes.clone(), parent_id)
        } else {
            let (base, sources) = reindex_tracked(&self.nodes);
            let parent_id = parent_id
                .map(|prior| {
                    self.position(prior)
                        .and_then(|old| sources.iter().position(|&source| source == old))
                        .map(|new_position| base[new_position].id)
                        .ok_or(Error::NotFound(prior))
                })
                .transpose()?;
            (base, parent_id)
        };

        let (smaller, greater): (Vec<OutlineNode>, Vec<OutlineNode>) =
            base.into_iter().partition(|n| n.page_num <= page_index);

        let after_smaller = smaller.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let new_id = greater
            .iter()
            .map(|n| n.id)
            .min()
            .map_or(after_smaller, |first_greater| first_greater.min(after_smaller));

        let shifted: HashSet<u32> = greater.iter().map(|n| n.id).collect();
        let new_position = smaller.len();

        let mut candidates = smaller;
        candidates.push(OutlineNode::new(new_id, title, page_index, parent_id));
        candidates.extend(greater.into_iter().map(|n| OutlineNode {
            id: n.id + 1,
            parent_id: n.parent_id.map(|p| if shifted.contains(&p) { p + 1 } else { p }),
            ..n
        }));

        let (nodes, sources) = reindex_tracked(&candidates);
        let inserted = sources
            .iter()
            .position(|&source| source == new_position)
            .map(|position| nodes[position].to_external())
            .ok_or(Error::NotFound(new_id))?;

        log::debug!(
            "Inserted outline entry {} ('{}') on page {}",
            inserted.id,
            inserted.title,
            inserted.page_num
        );
        self.nodes = nodes;
        Ok(inserted)
    }

    /// Update one entry in place and return it.
    ///
    /// Omitted fields keep their current values, and every check runs against
    /// the resulting values. Id order is not re-established unless
    /// [`OutlineOptions::reindex_on_update`] is set, in which case the returned
    /// node carries its new id.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `id` or the new parent names no node
    /// - [`Error::EmptyTitle`] if a new title has no printable content
    /// - [`Error::InvalidRange`] if the page is outside `1..=page_count`
    /// - [`Error::InvalidHierarchy`] if the parent targets a later page, the
    ///   parent is the node itself or one of its descendants, or a child of
    ///   the node targets an earlier page
    pub fn update(&mut self, id: u32, changes: OutlineUpdate) -> Result<OutlineNode> {
        let position = self.position(id).ok_or(Error::NotFound(id))?;
        let current = &self.nodes[position];

        let title = match changes.title {
            Some(title) => {
                let title = sanitize_title(&title);
                if title.is_empty() {
                    return Err(Error::EmptyTitle);
                }
                title
            },
            None => current.title.clone(),
        };
        let page_index = self.check_page(changes.page_num.unwrap_or(current.page_num + 1))?;
        let parent_id = changes.parent_id.unwrap_or(current.parent_id);

        if let Some(parent_id) = parent_id {
            if parent_id == id || self.descendant_ids(id).contains(&parent_id) {
                return Err(Error::InvalidHierarchy(format!(
                    "entry {} cannot be placed under itself or its descendant {}",
                    id, parent_id
                )));
            }
            let parent = self.find(parent_id).ok_or(Error::NotFound(parent_id))?;
            check_parent_page(parent, page_index)?;
        }

        if let Some(child) = self
            .nodes
            .iter()
            .find(|n| n.parent_id == Some(id) && n.page_num < page_index)
        {
            return Err(Error::InvalidHierarchy(format!(
                "page {} is after the page {} of child entry {}",
                page_index + 1,
                child.page_num + 1,
                child.id
            )));
        }

        let node = &mut self.nodes[position];
        node.title = title;
        node.page_num = page_index;
        node.parent_id = parent_id;

        if !self.options.reindex_on_update {
            return Ok(self.nodes[position].to_external());
        }

        let (nodes, sources) = reindex_tracked(&self.nodes);
        let updated = sources
            .iter()
            .position(|&source| source == position)
            .map(|new_position| nodes[new_position].to_external())
            .ok_or(Error::NotFound(id))?;
        self.nodes = nodes;
        Ok(updated)
    }

    /// Remove an entry together with all of its descendants.
    pub fn remove(&mut self, id: u32) -> Result<()> {
        if self.find(id).is_none() {
            return Err(Error::NotFound(id));
        }

        let mut removed = self.descendant_ids(id);
        removed.insert(id);

        let remaining: Vec<OutlineNode> = self
            .nodes
            .iter()
            .filter(|n| !removed.contains(&n.id))
            .cloned()
            .collect();

        log::debug!("Removed outline entry {} and {} descendants", id, removed.len() - 1);
        self.nodes = reindex(&remaining);
        Ok(())
    }

    fn find(&self, id: u32) -> Option<&OutlineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Validate a 1-based page number, returning the page index.
    fn check_page(&self, page_num: usize) -> Result<usize> {
        let page_count = self.page_count();
        if page_num == 0 || page_num > page_count {
            return Err(Error::InvalidRange {
                page: page_num,
                page_count,
            });
        }
        Ok(page_num - 1)
    }

    /// Ids of every node below `id`.
    fn descendant_ids(&self, id: u32) -> HashSet<u32> {
        let children = children_index(&self.nodes);
        let mut found = HashSet::new();
        collect_descendants(&self.nodes, &children, id, &mut found);
        found
    }
}

fn collect_descendants(
    nodes: &[OutlineNode],
    children: &HashMap<u32, Vec<usize>>,
    id: u32,
    found: &mut HashSet<u32>,
) {
    let Some(positions) = children.get(&id) else {
        return;
    };
    for &position in positions {
        let child_id = nodes[position].id;
        if found.insert(child_id) {
            collect_descendants(nodes, children, child_id, found);
        }
    }
}

fn check_parent_page(parent: &OutlineNode, page_index: usize) -> Result<()> {
    if parent.page_num > page_index {
        return Err(Error::InvalidHierarchy(format!(
            "page {} precedes parent entry {} on page {}",
            page_index + 1,
            parent.id,
            parent.page_num + 1
        )));
    }
    Ok(())
}
