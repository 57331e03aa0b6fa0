//! Bookmark title cleanup.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Strip non-printable characters, then surrounding whitespace.
///
/// An empty result means the entry has no usable title and is excluded from
/// the outline.
///
/// # Example
///
/// ```
/// use pdf_outline::outline::sanitize_title;
///
/// assert_eq!(sanitize_title("  Chapter\u{0}\u{7} 1\n"), "Chapter 1");
/// assert_eq!(sanitize_title("\u{200B}\t"), "");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|&c| is_printable(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Printable characters: everything outside the control, format, surrogate,
/// private use, unassigned and separator categories, plus the ASCII space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
    )
}
