//! Error types for the cobro-core library.

use thiserror::Error;

/// Main error type for the cobro library.
#[derive(Error, Debug)]
pub enum CobroError {
    /// Classification could not run.
    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    /// Tabular ingestion error.
    #[error("ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the classification engine.
///
/// Everything else that can go wrong during a run (unparsable amounts,
/// unresolved optional columns) is absorbed locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// Neither a total column nor a status-like column could be resolved.
    #[error("no classification basis: no total or status column among [{}]", columns.join(", "))]
    NoClassificationBasis { columns: Vec<String> },
}

/// Errors related to reading tabular sources.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Malformed delimited text.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON table.
    #[error("failed to read JSON table: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet that could not be opened or read.
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// Text table that is not valid UTF-8.
    #[error("table is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The source had no header row.
    #[error("table has no header row")]
    MissingHeader,

    /// File type not handled by any reader.
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Requested page does not exist.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// Text could not be extracted.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),
}

/// Errors related to writing classification results.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Workbook could not be built or saved.
    #[error("failed to write workbook: {0}")]
    Workbook(String),
}

/// Result type for the cobro library.
pub type Result<T> = std::result::Result<T, CobroError>;
