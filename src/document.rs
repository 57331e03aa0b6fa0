//! In-memory PDF object graph.
//!
//! [`PdfDocument`] holds the indirect objects of a document keyed by object
//! number, the catalog reference, and the page references collected from the
//! page tree. It is the native side the outline is read from and written to;
//! byte-level parsing and serialization belong to the document codec and are
//! not part of this crate.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::OutlineOptions;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use crate::outline::{emit_outline, OutlineStore};
use crate::pages::PageStore;
use crate::writer::OutlineBuilder;

/// Page tree depth limit (PDF spec recommended nesting limit).
const MAX_PAGE_TREE_DEPTH: u32 = 100;

/// Maximum length of an indirect reference chain followed by [`PdfDocument::resolve`].
const MAX_REFERENCE_CHAIN: usize = 32;

/// A PDF document held as an object table.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    /// Indirect objects by object number
    objects: IndexMap<u32, Object>,
    /// Document catalog
    root: ObjectRef,
    /// Page objects in page order
    page_refs: Vec<ObjectRef>,
}

impl PdfDocument {
    /// Create a document with `page_count` empty pages.
    ///
    /// Object 1 is the catalog, object 2 the page tree root, pages follow.
    ///
    /// # Example
    ///
    /// ```
    /// use pdf_outline::document::PdfDocument;
    ///
    /// let doc = PdfDocument::new(3);
    /// assert_eq!(doc.page_count(), 3);
    /// assert_eq!(doc.get_page_ref(0)?.id, 3);
    /// # Ok::<(), pdf_outline::Error>(())
    /// ```
    pub fn new(page_count: usize) -> Self {
        let mut objects = IndexMap::new();
        let pages_id = 2;
        let page_refs: Vec<ObjectRef> = (0..page_count)
            .map(|i| ObjectRef::new(pages_id + 1 + i as u32, 0))
            .collect();

        let mut catalog = Dictionary::new();
        catalog.insert("Type".to_string(), Object::name("Catalog"));
        catalog.insert("Pages".to_string(), Object::reference(pages_id));
        objects.insert(1, Object::Dictionary(catalog));

        let mut pages = Dictionary::new();
        pages.insert("Type".to_string(), Object::name("Pages"));
        pages.insert(
            "Kids".to_string(),
            Object::Array(page_refs.iter().map(|r| Object::Reference(*r)).collect()),
        );
        pages.insert("Count".to_string(), Object::Integer(page_count as i64));
        objects.insert(pages_id, Object::Dictionary(pages));

        for page_ref in &page_refs {
            let mut page = Dictionary::new();
            page.insert("Type".to_string(), Object::name("Page"));
            page.insert("Parent".to_string(), Object::reference(pages_id));
            page.insert(
                "MediaBox".to_string(),
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            );
            objects.insert(page_ref.id, Object::Dictionary(page));
        }

        Self {
            objects,
            root: ObjectRef::new(1, 0),
            page_refs,
        }
    }

    /// Adopt an existing object table.
    ///
    /// Page references are collected by walking the page tree from the
    /// catalog's `/Pages` entry.
    pub fn from_objects(
        objects: impl IntoIterator<Item = (u32, Object)>,
        root: ObjectRef,
    ) -> Result<Self> {
        let mut doc = Self {
            objects: objects.into_iter().collect(),
            root,
            page_refs: Vec::new(),
        };

        let catalog = doc.catalog()?;
        let pages_ref = catalog
            .as_dict()
            .ok_or_else(|| Error::InvalidPdf("Catalog is not a dictionary".to_string()))?
            .get("Pages")
            .ok_or_else(|| Error::InvalidPdf("Catalog missing /Pages entry".to_string()))?
            .as_reference()
            .ok_or_else(|| Error::InvalidPdf("/Pages is not a reference".to_string()))?;

        let mut page_refs = Vec::new();
        let mut visited = HashSet::new();
        doc.collect_pages(pages_ref, 0, &mut visited, &mut page_refs)?;
        log::debug!("Collected {} pages from the page tree", page_refs.len());

        doc.page_refs = page_refs;
        Ok(doc)
    }

    /// Recursively collect page references in page order.
    fn collect_pages(
        &self,
        node_ref: ObjectRef,
        depth: u32,
        visited: &mut HashSet<ObjectRef>,
        page_refs: &mut Vec<ObjectRef>,
    ) -> Result<()> {
        if depth > MAX_PAGE_TREE_DEPTH {
            return Err(Error::RecursionLimitExceeded(MAX_PAGE_TREE_DEPTH));
        }
        if !visited.insert(node_ref) {
            return Err(Error::CircularReference(node_ref));
        }

        let node = self.load_object(node_ref)?;
        let node_dict = node
            .as_dict()
            .ok_or_else(|| Error::InvalidPdf(format!("Page tree node {} is not a dictionary", node_ref)))?;

        let kids = node_dict.get("Kids").and_then(|obj| obj.as_array());
        match (node_dict.get("Type").and_then(|obj| obj.as_name()), kids) {
            (Some("Page"), _) | (None, None) => {
                page_refs.push(node_ref);
                Ok(())
            },
            (Some("Pages"), Some(kids)) | (None, Some(kids)) => {
                for kid in kids {
                    let kid_ref = kid.as_reference().ok_or_else(|| {
                        Error::InvalidPdf("Kid in /Kids array is not a reference".to_string())
                    })?;
                    self.collect_pages(kid_ref, depth + 1, visited, page_refs)?;
                }
                Ok(())
            },
            (Some("Pages"), None) => {
                Err(Error::InvalidPdf(format!("Pages node {} missing /Kids array", node_ref)))
            },
            (Some(other), _) => Err(Error::InvalidPdf(format!(
                "Unknown page tree node type /{} at {}",
                other, node_ref
            ))),
        }
    }

    /// Get an object by reference.
    pub fn get_object(&self, obj_ref: ObjectRef) -> Option<&Object> {
        self.objects.get(&obj_ref.id)
    }

    /// Load (clone) an object by reference.
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<Object> {
        self.get_object(obj_ref)
            .cloned()
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))
    }

    /// Follow indirect references until a direct object is reached.
    pub fn resolve(&self, obj: &Object) -> Result<Object> {
        let mut current = obj.clone();
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                Object::Reference(obj_ref) => current = self.load_object(obj_ref)?,
                direct => return Ok(direct),
            }
        }
        match current {
            Object::Reference(obj_ref) => Err(Error::CircularReference(obj_ref)),
            direct => Ok(direct),
        }
    }

    /// The document catalog reference.
    pub fn root_ref(&self) -> ObjectRef {
        self.root
    }

    /// Get the document catalog (root object).
    pub fn catalog(&self) -> Result<Object> {
        self.load_object(self.root)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Page object references in page order.
    pub fn page_refs(&self) -> &[ObjectRef] {
        &self.page_refs
    }

    /// Get the page object reference for a page index (0-based).
    pub fn get_page_ref(&self, page_index: usize) -> Result<ObjectRef> {
        self.page_refs.get(page_index).copied().ok_or(Error::InvalidRange {
            page: page_index + 1,
            page_count: self.page_refs.len(),
        })
    }

    /// Next unused object number.
    pub fn next_object_id(&self) -> u32 {
        self.objects.keys().max().map_or(1, |id| id + 1)
    }

    /// Insert or replace an object.
    pub fn insert_object(&mut self, id: u32, obj: Object) -> ObjectRef {
        self.objects.insert(id, obj);
        ObjectRef::new(id, 0)
    }

    /// Add an object under the next unused object number.
    pub fn add_object(&mut self, obj: Object) -> ObjectRef {
        let id = self.next_object_id();
        self.insert_object(id, obj)
    }

    /// Iterate over all objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, &Object)> {
        self.objects.iter().map(|(id, obj)| (ObjectRef::new(*id, 0), obj))
    }

    /// Replace the document outline with the contents of a builder.
    ///
    /// New outline objects are numbered after the highest existing object and
    /// the catalog's `/Outlines` entry is pointed at them. An empty builder
    /// removes `/Outlines`. Objects of a previous outline stay in the table,
    /// unreferenced.
    pub fn install_outline(&mut self, builder: &OutlineBuilder) -> Result<()> {
        let result = builder.build(&self.page_refs, self.next_object_id());

        let catalog = self
            .objects
            .get_mut(&self.root.id)
            .and_then(Object::as_dict_mut)
            .ok_or_else(|| Error::InvalidPdf("Catalog is not a dictionary".to_string()))?;

        let Some(result) = result else {
            catalog.remove("Outlines");
            log::debug!("Removed document outline");
            return Ok(());
        };

        catalog.insert("Outlines".to_string(), Object::Reference(result.root_ref));
        catalog.insert("PageMode".to_string(), Object::name("UseOutlines"));

        let mut ids: Vec<u32> = result.objects.keys().copied().collect();
        ids.sort_unstable();
        let mut objects = result.objects;
        for id in ids {
            if let Some(obj) = objects.remove(&id) {
                self.objects.insert(id, obj);
            }
        }

        log::debug!("Installed outline root at {}", result.root_ref);
        Ok(())
    }
}

impl PageStore for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_refs.len()
    }
}

impl OutlineStore<usize> {
    /// Read a document's outline into a new store bounded by its page count.
    pub fn from_document(doc: &mut PdfDocument, options: OutlineOptions) -> Result<Self> {
        let page_count = doc.page_count();
        Self::from_source(doc, page_count, options)
    }
}

impl<P: PageStore> OutlineStore<P> {
    /// Write the outline into a document, replacing its existing outline.
    ///
    /// Fails with [`Error::InvalidRange`] without touching the document if an
    /// entry targets a page the document does not have.
    pub fn write_to_document(&self, doc: &mut PdfDocument) -> Result<()> {
        let mut builder = OutlineBuilder::new();
        emit_outline(&self.ordered_nodes(), doc.page_count(), &mut builder)?;
        doc.install_outline(&builder)?;
        log::info!("Wrote {} outline entries into the document", self.len());
        Ok(())
    }
}
