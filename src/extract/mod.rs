//! Pure DOM extraction
//!
//! Extraction is a function of the rendered HTML string, decoupled from
//! fetching and dispatch so it can be unit tested against fixture documents
//! without a live rendering engine.

mod lesson;
mod root;

pub use lesson::{extract_lesson, LessonExtract, Slide, SlideError};
pub use root::extract_lesson_links;

/// Normalizes extracted text for storage
///
/// Collapses whitespace runs to a single space and trims. When
/// `strip_delimiters` is on, literal commas are removed as well, matching
/// the downstream delimited-format contract.
pub fn clean_text(raw: &str, strip_delimiters: bool) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if strip_delimiters {
        collapsed.replace(',', "")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("nǐ \n\t hǎo  ma", false), "nǐ hǎo ma");
    }

    #[test]
    fn test_clean_text_trims() {
        assert_eq!(clean_text("  hello  ", false), "hello");
    }

    #[test]
    fn test_clean_text_strips_commas_when_enabled() {
        assert_eq!(clean_text("one, two, three", true), "one two three");
    }

    #[test]
    fn test_clean_text_keeps_commas_when_disabled() {
        assert_eq!(clean_text("one, two", false), "one, two");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text("   ", true), "");
    }
}
