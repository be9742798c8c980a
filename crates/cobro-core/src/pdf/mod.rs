//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Text of every page, in page order. Pages that cannot be read are
    /// returned as empty strings.
    fn page_texts(&self) -> Result<Vec<String>>;
}

/// Load a PDF and return the text of each page, ready for
/// [`DocumentExtractor::extract`](crate::invoice::DocumentExtractor::extract).
pub fn page_texts(data: &[u8]) -> Result<Vec<String>> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    extractor.page_texts()
}
