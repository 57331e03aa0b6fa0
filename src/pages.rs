//! Page store seam.
//!
//! The outline only needs to know how many pages the document has: page numbers
//! given to insert/update are bounded by it, and imported JSON page numbers are
//! clamped to it.

/// Source of the document page count.
pub trait PageStore {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;
}

/// A fixed page count.
impl PageStore for usize {
    fn page_count(&self) -> usize {
        *self
    }
}

impl<T: PageStore + ?Sized> PageStore for &T {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }
}

impl<T: PageStore + ?Sized> PageStore for Box<T> {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }
}
