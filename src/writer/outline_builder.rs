//! Document outline (bookmarks) builder.
//!
//! Collects a bookmark tree entry by entry and turns it into the linked
//! object graph of PDF spec Section 12.3.3 (Document Outline): an
//! `/Outlines` root and one item dictionary per bookmark, chained through
//! `/First`, `/Last`, `/Prev`, `/Next` and `/Parent`.
//!
//! # Example
//!
//! ```
//! use pdf_outline::native::OutlineSink;
//! use pdf_outline::writer::OutlineBuilder;
//!
//! let mut outline = OutlineBuilder::new();
//! let chapter = outline.add_outline_entry("Chapter 1", 0, None)?;
//! outline.add_outline_entry("Section 1.1", 1, Some(&chapter))?;
//! outline.add_outline_entry("Chapter 2", 4, None)?;
//! assert_eq!(outline.len(), 2);
//! # Ok::<(), pdf_outline::Error>(())
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::native::OutlineSink;
use crate::object::{encode_text_string, Dictionary, Object, ObjectRef};

/// Position of an item in the builder: indices from the top level down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineHandle(Vec<usize>);

impl OutlineHandle {
    /// Nesting depth of the item (0 for top-level items).
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

/// A single outline item (bookmark).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Display title
    pub title: String,
    /// Target page (0-indexed)
    pub page: usize,
    /// Child items
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Create a new outline item pointing to a page.
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
            children: Vec::new(),
        }
    }

    /// Total number of descendants, written as `/Count`.
    ///
    /// Every item is written open, so the count is never negative.
    fn descendant_count(&self) -> i64 {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// Builder for document outlines (bookmarks).
#[derive(Debug, Clone, Default)]
pub struct OutlineBuilder {
    /// Top-level items
    items: Vec<OutlineItem>,
}

impl OutlineBuilder {
    /// Create a new outline builder.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of top-level items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get the top-level items.
    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    /// Look up an item by handle.
    pub fn get(&self, handle: &OutlineHandle) -> Option<&OutlineItem> {
        let (&first, rest) = handle.0.split_first()?;
        let mut current = self.items.get(first)?;
        for &index in rest {
            current = current.children.get(index)?;
        }
        Some(current)
    }

    fn get_mut(&mut self, handle: &OutlineHandle) -> Option<&mut OutlineItem> {
        let (&first, rest) = handle.0.split_first()?;
        let mut current = self.items.get_mut(first)?;
        for &index in rest {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }

    /// Build the outline objects for inclusion in a PDF.
    ///
    /// Objects are numbered from `start_obj_id`: the `/Outlines` root first,
    /// then the items in pre-order. Returns `None` for an empty outline.
    /// Items whose page is not in `page_refs` get no `/Dest`.
    pub fn build(&self, page_refs: &[ObjectRef], start_obj_id: u32) -> Option<OutlineBuildResult> {
        let mut objects: HashMap<u32, Object> = HashMap::new();

        let root_id = start_obj_id;
        let mut next_id = start_obj_id + 1;

        let mut item_ids: Vec<u32> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let (item_id, new_next_id) = build_item(item, root_id, page_refs, next_id, &mut objects);
            item_ids.push(item_id);
            next_id = new_next_id;
        }

        let (&first, &last) = (item_ids.first()?, item_ids.last()?);
        link_siblings(&item_ids, &mut objects);

        let total_count: i64 = self
            .items
            .iter()
            .map(|i| 1 + i.descendant_count())
            .sum();

        let mut root_dict = Dictionary::new();
        root_dict.insert("Type".to_string(), Object::name("Outlines"));
        root_dict.insert("First".to_string(), Object::reference(first));
        root_dict.insert("Last".to_string(), Object::reference(last));
        root_dict.insert("Count".to_string(), Object::Integer(total_count));
        objects.insert(root_id, Object::Dictionary(root_dict));

        log::debug!(
            "Built outline with {} objects ({} .. {})",
            objects.len(),
            root_id,
            next_id - 1
        );

        Some(OutlineBuildResult {
            root_ref: ObjectRef::new(root_id, 0),
            objects,
            next_obj_id: next_id,
        })
    }
}

impl OutlineSink for OutlineBuilder {
    type Handle = OutlineHandle;

    fn add_outline_entry(
        &mut self,
        title: &str,
        page_index: usize,
        parent: Option<&OutlineHandle>,
    ) -> Result<OutlineHandle> {
        let item = OutlineItem::new(title, page_index);
        match parent {
            None => {
                self.items.push(item);
                Ok(OutlineHandle(vec![self.items.len() - 1]))
            },
            Some(handle) => {
                let parent = self.get_mut(handle).ok_or_else(|| {
                    Error::InvalidHierarchy(format!("unknown outline parent {:?}", handle.0))
                })?;
                parent.children.push(item);
                let mut path = handle.0.clone();
                path.push(parent.children.len() - 1);
                Ok(OutlineHandle(path))
            },
        }
    }
}

/// Build a single outline item and its children.
///
/// Returns the item's object id and the next free id.
fn build_item(
    item: &OutlineItem,
    parent_id: u32,
    page_refs: &[ObjectRef],
    start_id: u32,
    objects: &mut HashMap<u32, Object>,
) -> (u32, u32) {
    let item_id = start_id;
    let mut next_id = start_id + 1;

    let mut dict = Dictionary::new();
    dict.insert("Title".to_string(), Object::String(encode_text_string(&item.title)));
    dict.insert("Parent".to_string(), Object::reference(parent_id));

    match page_refs.get(item.page) {
        Some(page_ref) => {
            let dest = Object::Array(vec![Object::Reference(*page_ref), Object::name("Fit")]);
            dict.insert("Dest".to_string(), dest);
        },
        None => log::warn!("Outline item '{}' targets missing page {}", item.title, item.page),
    }

    let mut child_ids: Vec<u32> = Vec::with_capacity(item.children.len());
    for child in &item.children {
        let (child_id, new_next_id) = build_item(child, item_id, page_refs, next_id, objects);
        child_ids.push(child_id);
        next_id = new_next_id;
    }

    if let (Some(&first), Some(&last)) = (child_ids.first(), child_ids.last()) {
        dict.insert("First".to_string(), Object::reference(first));
        dict.insert("Last".to_string(), Object::reference(last));

        let count = item.descendant_count();
        if count != 0 {
            dict.insert("Count".to_string(), Object::Integer(count));
        }

        link_siblings(&child_ids, objects);
    }

    objects.insert(item_id, Object::Dictionary(dict));
    (item_id, next_id)
}

/// Set `/Prev` and `/Next` on a run of sibling items.
fn link_siblings(ids: &[u32], objects: &mut HashMap<u32, Object>) {
    for (i, id) in ids.iter().enumerate() {
        let Some(dict) = objects.get_mut(id).and_then(Object::as_dict_mut) else {
            continue;
        };
        if i > 0 {
            dict.insert("Prev".to_string(), Object::reference(ids[i - 1]));
        }
        if let Some(&next) = ids.get(i + 1) {
            dict.insert("Next".to_string(), Object::reference(next));
        }
    }
}

/// Result of building an outline.
#[derive(Debug)]
pub struct OutlineBuildResult {
    /// Reference to the root outline object
    pub root_ref: ObjectRef,
    /// All outline objects
    pub objects: HashMap<u32, Object>,
    /// Next available object ID
    pub next_obj_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dict: &Object, key: &str) -> Option<Object> {
        dict.as_dict().and_then(|d| d.get(key)).cloned()
    }

    fn sample_builder() -> OutlineBuilder {
        let mut builder = OutlineBuilder::new();
        let chapter = builder.add_outline_entry("Chapter 1", 0, None).unwrap();
        let section = builder
            .add_outline_entry("Section 1.1", 1, Some(&chapter))
            .unwrap();
        builder
            .add_outline_entry("Subsection 1.1.1", 2, Some(&section))
            .unwrap();
        builder
            .add_outline_entry("Section 1.2", 3, Some(&chapter))
            .unwrap();
        builder.add_outline_entry("Chapter 2", 4, None).unwrap();
        builder
    }

    #[test]
    fn test_outline_builder_empty() {
        let builder = OutlineBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.len(), 0);
        assert!(builder.build(&[], 1).is_none());
    }

    #[test]
    fn test_outline_builder_hierarchy() {
        let builder = sample_builder();

        let items = builder.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].children.len(), 2); // Section 1.1 and 1.2
        assert_eq!(items[0].children[0].children.len(), 1); // Subsection 1.1.1
        assert_eq!(items[1].title, "Chapter 2");
    }

    #[test]
    fn test_handles_address_items() {
        let mut builder = OutlineBuilder::new();
        let chapter = builder.add_outline_entry("Chapter 1", 0, None).unwrap();
        let section = builder
            .add_outline_entry("Section 1.1", 1, Some(&chapter))
            .unwrap();

        assert_eq!(section.depth(), 1);
        assert_eq!(builder.get(&section).map(|i| i.title.as_str()), Some("Section 1.1"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut builder = OutlineBuilder::new();
        let bogus = OutlineHandle(vec![3, 1]);
        let result = builder.add_outline_entry("Lost", 0, Some(&bogus));
        assert!(matches!(result, Err(Error::InvalidHierarchy(_))));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_outline_build() {
        let mut builder = OutlineBuilder::new();
        builder.add_outline_entry("Page 1", 0, None).unwrap();
        builder.add_outline_entry("Page 2", 1, None).unwrap();

        let page_refs = vec![ObjectRef::new(10, 0), ObjectRef::new(11, 0)];

        let result = builder.build(&page_refs, 100).unwrap();
        assert_eq!(result.root_ref.id, 100);
        assert_eq!(result.next_obj_id, 103);

        let root = &result.objects[&100];
        assert_eq!(entry(root, "First"), Some(Object::reference(101)));
        assert_eq!(entry(root, "Last"), Some(Object::reference(102)));
        assert_eq!(entry(root, "Count"), Some(Object::Integer(2)));

        let first = &result.objects[&101];
        assert_eq!(entry(first, "Next"), Some(Object::reference(102)));
        assert_eq!(entry(first, "Prev"), None);
        assert_eq!(
            entry(first, "Dest"),
            Some(Object::Array(vec![Object::Reference(page_refs[0]), Object::name("Fit")]))
        );
        assert_eq!(entry(&result.objects[&102], "Prev"), Some(Object::reference(101)));
    }

    #[test]
    fn test_build_nested_links() {
        let builder = sample_builder();
        let page_refs: Vec<ObjectRef> = (0..5).map(|i| ObjectRef::new(20 + i, 0)).collect();
        let result = builder.build(&page_refs, 1).unwrap();

        // 1: root, 2: Chapter 1, 3: Section 1.1, 4: Subsection, 5: Section 1.2, 6: Chapter 2
        let chapter = &result.objects[&2];
        assert_eq!(entry(chapter, "First"), Some(Object::reference(3)));
        assert_eq!(entry(chapter, "Last"), Some(Object::reference(5)));
        assert_eq!(entry(chapter, "Count"), Some(Object::Integer(3)));
        assert_eq!(entry(chapter, "Next"), Some(Object::reference(6)));
        assert_eq!(entry(&result.objects[&4], "Parent"), Some(Object::reference(3)));
        assert_eq!(entry(&result.objects[&1], "Count"), Some(Object::Integer(5)));
    }

    #[test]
    fn test_non_ascii_title_encoded_utf16() {
        let mut builder = OutlineBuilder::new();
        builder.add_outline_entry("Ünïcode", 0, None).unwrap();
        let result = builder.build(&[ObjectRef::new(3, 0)], 10).unwrap();

        let title = entry(&result.objects[&11], "Title").unwrap();
        assert_eq!(title.as_string().map(|b| &b[..2]), Some(&[0xFE, 0xFF][..]));
        assert_eq!(title.as_text_string().as_deref(), Some("Ünïcode"));
    }

    #[test]
    fn test_descendant_count() {
        let mut item = OutlineItem::new("Root", 0);
        let mut child1 = OutlineItem::new("Child 1", 1);
        child1.children.push(OutlineItem::new("Grandchild 1", 2));
        child1.children.push(OutlineItem::new("Grandchild 2", 3));
        item.children.push(child1);
        item.children.push(OutlineItem::new("Child 2", 4));

        // Root has 2 children, child1 has 2 grandchildren = 4 total descendants
        assert_eq!(item.descendant_count(), 4);
    }
}
