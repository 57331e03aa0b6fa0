//! Native (document-side) outline representation and the codec seams.
//!
//! A document codec exposes its bookmarks as a tree of [`NativeOutlineItem`]s
//! together with the ordered list of page references used to resolve their
//! targets ([`OutlineSource`]), and accepts new bookmarks one entry at a time,
//! anchored under previously created parents ([`OutlineSink`]).
//!
//! [`PdfDocument`](crate::document::PdfDocument) implements the read side;
//! [`OutlineBuilder`](crate::writer::OutlineBuilder) implements the write side.

mod reader;

use crate::config::OutlineOptions;
use crate::error::Result;
use crate::object::ObjectRef;

/// A single bookmark as stored in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeOutlineItem {
    /// The title of this bookmark, `None` when the entry has no `/Title`
    pub title: Option<String>,

    /// The destination, `None` if it cannot be determined
    pub dest: Option<Destination>,

    /// Child bookmarks under this item
    pub children: Vec<NativeOutlineItem>,
}

impl NativeOutlineItem {
    /// Create a bookmark pointing at a page object.
    pub fn new(title: impl Into<String>, page_ref: ObjectRef) -> Self {
        Self {
            title: Some(title.into()),
            dest: Some(Destination::Page(page_ref)),
            children: Vec::new(),
        }
    }

    /// Add a child bookmark.
    pub fn with_child(mut self, child: NativeOutlineItem) -> Self {
        self.children.push(child);
        self
    }
}

/// Destination of a bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Page object reference
    Page(ObjectRef),

    /// Named destination that could not be resolved to a page
    Named(String),

    /// Link leaving the document (URI, remote or embedded file, launch)
    External(String),
}

/// Read side of a document codec.
pub trait OutlineSource {
    /// The document's bookmark tree, empty when there is none.
    fn native_outline(&mut self, options: &OutlineOptions) -> Result<Vec<NativeOutlineItem>>;

    /// Page object references in page order.
    fn page_refs(&mut self) -> Result<Vec<ObjectRef>>;
}

/// Write side of a document codec.
pub trait OutlineSink {
    /// Handle to a created bookmark, used to anchor its children.
    type Handle;

    /// Create a bookmark for `page_index` (0-based) under `parent`, or at the
    /// top level when `parent` is `None`.
    fn add_outline_entry(
        &mut self,
        title: &str,
        page_index: usize,
        parent: Option<&Self::Handle>,
    ) -> Result<Self::Handle>;
}
