//! Error types for the gabarito-core library.
//!
//! Text extraction itself never fails: malformed or unstructured text yields
//! empty results. These errors belong to the I/O edges (PDF decoding, config
//! files, network fetches made by callers).

use thiserror::Error;

/// Main error type for the gabarito library.
#[derive(Error, Debug)]
pub enum GabaritoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Listing page or PDF download error.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the gabarito library.
pub type Result<T> = std::result::Result<T, GabaritoError>;
