//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, RawText, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// lopdf validates the document, counts pages and removes empty-password
/// encryption; pdf-extract decodes the text stream page by page.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF and decode its text in one step.
    pub fn decode(data: &[u8]) -> Result<RawText> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        extractor.extract_text()
    }

    /// pdf-extract panics on some malformed streams instead of returning an error.
    fn extract_pages(&self) -> Result<Vec<String>> {
        let data = &self.raw_data;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => {
                warn!("pdf-extract panicked while decoding text");
                Err(PdfError::TextExtraction(
                    "decoder panicked (malformed document)".to_string(),
                ))
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Save decrypted document to raw_data for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<RawText> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let pages = self.extract_pages()?;
        let raw = RawText::from_pages(&pages);
        debug!(
            "Decoded {} chars from {} pages",
            raw.text.len(),
            raw.page_count
        );
        Ok(raw)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        let mut pages = self.extract_pages()?;
        let idx = (page - 1) as usize;
        if idx >= pages.len() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(pages.swap_remove(idx))
    }
}
