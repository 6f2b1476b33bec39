//! PDF processing module.
//!
//! Only the linear text stream is recovered; there is no layout analysis and
//! no OCR of image-only pages.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Decoded text of one PDF, pages joined with [`PAGE_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    pub text: String,
    pub page_count: u32,
}

impl RawText {
    /// Join per-page text.
    pub fn from_pages(pages: &[String]) -> Self {
        Self {
            text: pages.join(PAGE_SEPARATOR),
            page_count: pages.len() as u32,
        }
    }

    /// Wrap text decoded elsewhere. Form feeds, when present, count as page breaks.
    pub fn from_plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let page_count = text.matches('\u{000c}').count() as u32 + 1;
        Self { text, page_count }
    }

    /// True when the text is too short to hold anything extractable.
    pub fn looks_scanned(&self, min_text_length: usize) -> bool {
        self.text.trim().chars().count() < min_text_length
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF-to-text decoders.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<RawText>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pages_uses_double_newline() {
        let raw = RawText::from_pages(&["one".to_string(), "two".to_string()]);
        assert_eq!(raw.text, "one\n\ntwo");
        assert_eq!(raw.page_count, 2);
    }

    #[test]
    fn test_from_plain_counts_form_feeds() {
        assert_eq!(RawText::from_plain("a").page_count, 1);
        assert_eq!(RawText::from_plain("a\u{000c}b\u{000c}c").page_count, 3);
    }

    #[test]
    fn test_looks_scanned() {
        assert!(RawText::from_plain("   \n  ").looks_scanned(50));
        assert!(!RawText::from_plain("x".repeat(60)).looks_scanned(50));
    }
}
