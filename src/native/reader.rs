//! Reading the document outline out of a [`PdfDocument`].
//!
//! Walks the `/Outlines` dictionary through `/First` and `/Next` links and
//! resolves each item's destination to a page object reference.

use std::collections::HashSet;

use super::{Destination, NativeOutlineItem, OutlineSource};
use crate::config::OutlineOptions;
use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{Dictionary, Object, ObjectRef};

impl PdfDocument {
    /// Get the document outline (bookmarks) if present.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Vec<NativeOutlineItem>))` - Bookmarks found and parsed
    /// - `Ok(None)` - No bookmarks in document
    /// - `Err` - The catalog could not be loaded
    ///
    /// Broken links inside the tree end the affected sibling chain instead of
    /// failing the whole read.
    ///
    /// # Example
    ///
    /// ```
    /// use pdf_outline::config::OutlineOptions;
    /// use pdf_outline::document::PdfDocument;
    ///
    /// let doc = PdfDocument::new(1);
    /// assert!(doc.get_outline(&OutlineOptions::default())?.is_none());
    /// # Ok::<(), pdf_outline::Error>(())
    /// ```
    pub fn get_outline(&self, options: &OutlineOptions) -> Result<Option<Vec<NativeOutlineItem>>> {
        let catalog = self.catalog()?;

        let outlines = match catalog.as_dict().and_then(|dict| dict.get("Outlines")) {
            Some(obj) => self.resolve(obj)?,
            None => return Ok(None),
        };

        let first_ref = match outlines.as_dict().and_then(|dict| dict.get("First")) {
            Some(Object::Reference(obj_ref)) => *obj_ref,
            _ => return Ok(None),
        };

        let mut visited = HashSet::new();
        let items = self.parse_outline_level(first_ref, 0, options, &mut visited);

        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(items))
        }
    }

    /// Parse a sibling chain starting at `first_ref`, children included.
    fn parse_outline_level(
        &self,
        first_ref: ObjectRef,
        depth: usize,
        options: &OutlineOptions,
        visited: &mut HashSet<ObjectRef>,
    ) -> Vec<NativeOutlineItem> {
        let mut items = Vec::new();
        if depth >= options.max_depth {
            log::warn!("Outline deeper than {} levels, ignoring entries below", options.max_depth);
            return items;
        }

        let mut current_ref = Some(first_ref);
        while let Some(item_ref) = current_ref {
            if items.len() >= options.max_siblings {
                log::warn!("Outline level exceeds {} siblings, truncating", options.max_siblings);
                break;
            }
            if !visited.insert(item_ref) {
                log::warn!("Circular outline link at object {}, stopping", item_ref);
                break;
            }

            let item_obj = match self.load_object(item_ref) {
                Ok(obj) => obj,
                Err(e) => {
                    log::warn!("Failed to load outline item {}: {}", item_ref, e);
                    break;
                },
            };
            let Some(dict) = item_obj.as_dict() else {
                log::warn!("Outline item {} is not a dictionary", item_ref);
                break;
            };

            let title = dict
                .get("Title")
                .and_then(|obj| self.resolve(obj).ok())
                .and_then(|obj| obj.as_text_string());
            let dest = self.parse_outline_destination(dict, options);

            let children = match dict.get("First") {
                Some(Object::Reference(child_ref)) => {
                    self.parse_outline_level(*child_ref, depth + 1, options, visited)
                },
                _ => Vec::new(),
            };

            items.push(NativeOutlineItem {
                title,
                dest,
                children,
            });

            current_ref = match dict.get("Next") {
                Some(Object::Reference(obj_ref)) => Some(*obj_ref),
                _ => None,
            };
        }

        items
    }

    /// Parse destination from an outline item.
    fn parse_outline_destination(
        &self,
        item: &Dictionary,
        options: &OutlineOptions,
    ) -> Option<Destination> {
        // Try /Dest entry first
        if let Some(dest_obj) = item.get("Dest") {
            return self.resolve_destination(dest_obj, options, 0);
        }

        // Then the /A (action) entry
        let action = self.resolve(item.get("A")?).ok()?;
        let action = action.as_dict()?;
        match action.get("S").and_then(|s| s.as_name()) {
            Some("GoTo") | None => {
                let dest_obj = action.get("D")?;
                self.resolve_destination(dest_obj, options, 0)
            },
            Some("URI") => {
                let uri = action
                    .get("URI")
                    .and_then(|obj| self.resolve(obj).ok())
                    .and_then(|obj| obj.as_text_string())
                    .unwrap_or_default();
                Some(Destination::External(uri))
            },
            Some(kind @ ("GoToR" | "GoToE" | "Launch")) => {
                let target = action
                    .get("F")
                    .and_then(|obj| self.resolve(obj).ok())
                    .and_then(|obj| file_spec_name(&obj))
                    .unwrap_or_else(|| kind.to_string());
                Some(Destination::External(target))
            },
            Some(other) => {
                log::debug!("Ignoring outline action /{}", other);
                None
            },
        }
    }

    /// Resolve a destination object to a [`Destination`].
    fn resolve_destination(
        &self,
        dest_obj: &Object,
        options: &OutlineOptions,
        depth: usize,
    ) -> Option<Destination> {
        if depth > options.max_depth {
            return None;
        }

        match dest_obj {
            // Direct destination: [page_ref /Fit ...]
            Object::Array(arr) => match arr.first()? {
                Object::Reference(page_ref) => Some(Destination::Page(*page_ref)),
                // Some producers write a page index instead of a reference
                Object::Integer(index) => usize::try_from(*index)
                    .ok()
                    .and_then(|index| self.page_refs().get(index))
                    .map(|page_ref| Destination::Page(*page_ref)),
                _ => None,
            },

            // Named destinations: names (PDF 1.1) or strings (PDF 1.2+)
            Object::Name(name) => self.resolve_named(name.as_bytes(), name.clone(), options, depth),
            Object::String(bytes) => {
                let name = crate::object::decode_text_string(bytes);
                self.resolve_named(bytes, name, options, depth)
            },

            // Destination dictionary from a name lookup: << /D [...] >>
            Object::Dictionary(dict) => {
                self.resolve_destination(dict.get("D")?, options, depth + 1)
            },

            // Indirect reference to destination
            Object::Reference(_) => {
                let resolved = self.resolve(dest_obj).ok()?;
                self.resolve_destination(&resolved, options, depth + 1)
            },

            _ => None,
        }
    }

    fn resolve_named(
        &self,
        key: &[u8],
        name: String,
        options: &OutlineOptions,
        depth: usize,
    ) -> Option<Destination> {
        if !options.resolve_named_destinations {
            return Some(Destination::Named(name));
        }

        let found = self.lookup_named_destination(key, options);
        match found.and_then(|dest| self.resolve_destination(&dest, options, depth + 1)) {
            Some(dest) => Some(dest),
            None => Some(Destination::Named(name)),
        }
    }

    /// Look a named destination up in the catalog `/Dests` dictionary and the
    /// `/Names` → `/Dests` name tree.
    fn lookup_named_destination(&self, key: &[u8], options: &OutlineOptions) -> Option<Object> {
        let catalog = self.catalog().ok()?;
        let catalog = catalog.as_dict()?;

        if let Some(dests) = catalog.get("Dests").and_then(|obj| self.resolve(obj).ok()) {
            let name = String::from_utf8_lossy(key);
            if let Some(dest) = dests.as_dict().and_then(|dict| dict.get(&*name)) {
                return Some(dest.clone());
            }
        }

        let names = self.resolve(catalog.get("Names")?).ok()?;
        let tree = self.resolve(names.as_dict()?.get("Dests")?).ok()?;
        let mut visited = HashSet::new();
        self.search_name_tree(&tree, key, 0, options, &mut visited)
    }

    /// Search a name tree node and its `/Kids` for `key`.
    fn search_name_tree(
        &self,
        node: &Object,
        key: &[u8],
        depth: usize,
        options: &OutlineOptions,
        visited: &mut HashSet<ObjectRef>,
    ) -> Option<Object> {
        if depth >= options.max_depth {
            return None;
        }
        let dict = node.as_dict()?;

        if let Some(Object::Array(pairs)) = dict.get("Names") {
            for pair in pairs.chunks_exact(2) {
                if pair[0].as_string() == Some(key) {
                    return Some(pair[1].clone());
                }
            }
        }

        for kid in dict.get("Kids").and_then(|kids| kids.as_array())? {
            let Some(kid_ref) = kid.as_reference() else {
                continue;
            };
            if !visited.insert(kid_ref) {
                continue;
            }
            let Ok(kid_node) = self.load_object(kid_ref) else {
                continue;
            };
            if let Some(found) = self.search_name_tree(&kid_node, key, depth + 1, options, visited) {
                return Some(found);
            }
        }

        None
    }
}

/// Name of the file a remote action points at.
fn file_spec_name(spec: &Object) -> Option<String> {
    match spec {
        Object::String(_) => spec.as_text_string(),
        Object::Dictionary(dict) => dict
            .get("UF")
            .or_else(|| dict.get("F"))
            .and_then(|obj| obj.as_text_string()),
        _ => None,
    }
}

impl OutlineSource for PdfDocument {
    fn native_outline(&mut self, options: &OutlineOptions) -> Result<Vec<NativeOutlineItem>> {
        Ok(self.get_outline(options)?.unwrap_or_default())
    }

    fn page_refs(&mut self) -> Result<Vec<ObjectRef>> {
        Ok(PdfDocument::page_refs(self).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn title(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec())
    }

    fn fit(page_ref: ObjectRef) -> Object {
        Object::Array(vec![Object::Reference(page_ref), Object::name("Fit")])
    }

    /// Install `/Outlines` with the given first item and return the document.
    fn with_outline(mut doc: PdfDocument, first: u32) -> PdfDocument {
        let outlines = doc.add_object(dict(vec![
            ("Type", Object::name("Outlines")),
            ("First", Object::reference(first)),
        ]));
        let root = doc.root_ref();
        let mut catalog = doc.catalog().unwrap();
        catalog
            .as_dict_mut()
            .unwrap()
            .insert("Outlines".to_string(), Object::Reference(outlines));
        doc.insert_object(root.id, catalog);
        doc
    }

    #[test]
    fn test_outline_missing() {
        let doc = PdfDocument::new(2);
        assert!(doc.get_outline(&OutlineOptions::default()).unwrap().is_none());
    }

    #[test]
    fn test_outline_hierarchy() {
        let mut doc = PdfDocument::new(3);
        let pages = doc.page_refs().to_vec();

        // 10: Chapter 1 -> 11: Section 1.1 ; 12: Chapter 2 via GoTo action
        doc.insert_object(
            10,
            dict(vec![
                ("Title", title("Chapter 1")),
                ("Dest", fit(pages[0])),
                ("First", Object::reference(11)),
                ("Next", Object::reference(12)),
            ]),
        );
        doc.insert_object(11, dict(vec![("Title", title("Section 1.1")), ("Dest", fit(pages[1]))]));
        doc.insert_object(
            12,
            dict(vec![
                ("Title", title("Chapter 2")),
                ("A", dict(vec![("S", Object::name("GoTo")), ("D", fit(pages[2]))])),
            ]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(
            outline,
            vec![
                NativeOutlineItem::new("Chapter 1", pages[0])
                    .with_child(NativeOutlineItem::new("Section 1.1", pages[1])),
                NativeOutlineItem::new("Chapter 2", pages[2]),
            ]
        );
    }

    #[test]
    fn test_uri_action_is_external() {
        let mut doc = PdfDocument::new(1);
        doc.insert_object(
            10,
            dict(vec![
                ("Title", title("Website")),
                (
                    "A",
                    dict(vec![("S", Object::name("URI")), ("URI", title("https://example.com"))]),
                ),
            ]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(
            outline[0].dest,
            Some(Destination::External("https://example.com".to_string()))
        );
    }

    #[test]
    fn test_named_destination_via_dests_dictionary() {
        let mut doc = PdfDocument::new(2);
        let pages = doc.page_refs().to_vec();
        let dests = doc.add_object(dict(vec![("intro", dict(vec![("D", fit(pages[1]))]))]));

        let root = doc.root_ref();
        let mut catalog = doc.catalog().unwrap();
        catalog
            .as_dict_mut()
            .unwrap()
            .insert("Dests".to_string(), Object::Reference(dests));
        doc.insert_object(root.id, catalog);

        doc.insert_object(10, dict(vec![("Title", title("Intro")), ("Dest", Object::name("intro"))]));
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(outline[0].dest, Some(Destination::Page(pages[1])));

        let strict = doc.get_outline(&OutlineOptions::strict()).unwrap().unwrap();
        assert_eq!(strict[0].dest, Some(Destination::Named("intro".to_string())));
    }

    #[test]
    fn test_named_destination_via_name_tree() {
        let mut doc = PdfDocument::new(3);
        let pages = doc.page_refs().to_vec();
        let leaf = doc.add_object(dict(vec![(
            "Names",
            Object::Array(vec![title("a"), fit(pages[0]), title("appendix"), fit(pages[2])]),
        )]));
        let tree = doc.add_object(dict(vec![("Kids", Object::Array(vec![Object::Reference(leaf)]))]));

        let root = doc.root_ref();
        let mut catalog = doc.catalog().unwrap();
        catalog.as_dict_mut().unwrap().insert(
            "Names".to_string(),
            dict(vec![("Dests", Object::Reference(tree))]),
        );
        doc.insert_object(root.id, catalog);

        doc.insert_object(
            10,
            dict(vec![
                ("Title", title("Appendix")),
                ("Dest", title("appendix")),
                ("Next", Object::reference(11)),
            ]),
        );
        doc.insert_object(
            11,
            dict(vec![("Title", title("Missing")), ("Dest", title("nowhere"))]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(outline[0].dest, Some(Destination::Page(pages[2])));
        assert_eq!(outline[1].dest, Some(Destination::Named("nowhere".to_string())));
    }

    #[test]
    fn test_circular_next_chain_terminates() {
        let mut doc = PdfDocument::new(1);
        let page = doc.page_refs()[0];
        doc.insert_object(
            10,
            dict(vec![("Title", title("A")), ("Dest", fit(page)), ("Next", Object::reference(11))]),
        );
        doc.insert_object(
            11,
            dict(vec![("Title", title("B")), ("Dest", fit(page)), ("Next", Object::reference(10))]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(outline.len(), 2);
    }

    #[test]
    fn test_depth_and_sibling_limits() {
        let mut doc = PdfDocument::new(1);
        let page = doc.page_refs()[0];
        doc.insert_object(
            10,
            dict(vec![
                ("Title", title("Top")),
                ("Dest", fit(page)),
                ("First", Object::reference(11)),
                ("Next", Object::reference(12)),
            ]),
        );
        doc.insert_object(11, dict(vec![("Title", title("Nested")), ("Dest", fit(page))]));
        doc.insert_object(12, dict(vec![("Title", title("Second")), ("Dest", fit(page))]));
        let doc = with_outline(doc, 10);

        let options = OutlineOptions::default().with_max_depth(1).with_max_siblings(1);
        let outline = doc.get_outline(&options).unwrap().unwrap();
        assert_eq!(outline.len(), 1);
        assert!(outline[0].children.is_empty());
    }

    #[test]
    fn test_missing_title_and_utf16_title() {
        let mut doc = PdfDocument::new(1);
        let page = doc.page_refs()[0];
        doc.insert_object(
            10,
            dict(vec![("Dest", fit(page)), ("Next", Object::reference(11))]),
        );
        doc.insert_object(
            11,
            dict(vec![
                ("Title", Object::String(vec![0xFE, 0xFF, 0x00, 0xC4, 0x00, 0x62])),
                ("Dest", fit(page)),
            ]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(outline[0].title, None);
        assert_eq!(outline[1].title.as_deref(), Some("Äb"));
    }

    #[test]
    fn test_integer_page_destination() {
        let mut doc = PdfDocument::new(2);
        let pages = doc.page_refs().to_vec();
        doc.insert_object(
            10,
            dict(vec![
                ("Title", title("Second page")),
                ("Dest", Object::Array(vec![Object::Integer(1), Object::name("Fit")])),
            ]),
        );
        let doc = with_outline(doc, 10);

        let outline = doc.get_outline(&OutlineOptions::default()).unwrap().unwrap();
        assert_eq!(outline[0].dest, Some(Destination::Page(pages[1])));
    }
}
