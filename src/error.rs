//! Error types for the outline library.
//!
//! This module defines all error types that can occur while editing, importing,
//! exporting, reading or writing document outlines.

use crate::object::ObjectRef;

/// Result type alias for outline library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline processing.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// No outline node (or requested parent node) carries this id
    #[error("Outline node not found: {0}")]
    NotFound(u32),

    /// Page number outside the document's page range
    #[error("Page number {page} is outside the document page range 1..={page_count}")]
    InvalidRange {
        /// Offending page number (1-based)
        page: usize,
        /// Number of pages in the document
        page_count: usize,
    },

    /// Requested edit contradicts the outline hierarchy
    #[error("Invalid outline hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Title is empty once non-printable characters and surrounding whitespace are removed
    #[error("Outline title is empty after sanitization")]
    EmptyTitle,

    /// Malformed outline JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Referenced object not found in the object table
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),
}
