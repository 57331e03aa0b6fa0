//! PDF writing support for outlines.
//!
//! ## Architecture
//!
//! ```text
//! OutlineNode[] (canonical store)
//!     ↓
//! [emit_outline] (parents before children)
//!     ↓
//! [OutlineBuilder] (bookmark tree)
//!     ↓
//! [PdfDocument::install_outline] (linked /Outlines objects)
//! ```

mod outline_builder;

pub use outline_builder::{OutlineBuildResult, OutlineBuilder, OutlineHandle, OutlineItem};
