//! Configuration for outline processing.

/// Outline processing options.
///
/// # Example
///
/// ```
/// use pdf_outline::config::OutlineOptions;
///
/// // Lenient reading, the default
/// let lenient = OutlineOptions::default();
/// assert!(lenient.resolve_named_destinations);
///
/// // Keep page order canonical after every update
/// let options = OutlineOptions::new().with_reindex_on_update(true);
/// assert!(options.reindex_on_update);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineOptions {
    /// Maximum nesting depth followed while reading a native outline tree.
    ///
    /// Entries below this depth are ignored.
    pub max_depth: usize,

    /// Maximum number of siblings read at one level of a native outline tree
    pub max_siblings: usize,

    /// Look named destinations up in the catalog `/Dests` dictionary and the
    /// `/Names` tree instead of dropping the bookmarks that use them
    pub resolve_named_destinations: bool,

    /// Re-run the reindexer after every update.
    ///
    /// Off by default: an update mutates one node in place and leaves id order
    /// untouched until the next insert, remove or import.
    pub reindex_on_update: bool,

    /// Pretty-print exported JSON with two-space indentation
    pub pretty_json: bool,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineOptions {
    /// Create new options with defaults (lenient reading).
    pub fn new() -> Self {
        Self::lenient()
    }

    /// Lenient mode: resolve named destinations, generous traversal limits.
    pub fn lenient() -> Self {
        Self {
            max_depth: 64,
            max_siblings: 10_000,
            resolve_named_destinations: true,
            reindex_on_update: false,
            pretty_json: true,
        }
    }

    /// Strict mode: only explicit page destinations count, tight limits.
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            max_siblings: 1_000,
            resolve_named_destinations: false,
            reindex_on_update: false,
            pretty_json: true,
        }
    }

    /// Set the maximum outline depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum number of siblings per level.
    pub fn with_max_siblings(mut self, max_siblings: usize) -> Self {
        self.max_siblings = max_siblings;
        self
    }

    /// Enable named destination resolution.
    pub fn with_named_destinations(mut self, enable: bool) -> Self {
        self.resolve_named_destinations = enable;
        self
    }

    /// Enable reindexing after updates.
    pub fn with_reindex_on_update(mut self, enable: bool) -> Self {
        self.reindex_on_update = enable;
        self
    }

    /// Enable pretty-printed JSON.
    pub fn with_pretty_json(mut self, enable: bool) -> Self {
        self.pretty_json = enable;
        self
    }
}
