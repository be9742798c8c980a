//! Core library for invoice payment classification.
//!
//! This crate provides:
//! - Locale-tolerant amount parsing and text normalization
//! - Column resolution, amount reconciliation and tolerance-based classification
//! - Free-text status classification with negation priority
//! - Rule-based field extraction from unstructured invoice documents
//! - Tabular ingestion (CSV, JSON, spreadsheets) and PDF page text loading
//! - Workbook export with one sheet per partition

pub mod classify;
pub mod error;
#[cfg(feature = "xlsx")]
pub mod export;
pub mod ingest;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use classify::{
    Classification, ClassificationEngine, ClassificationMode, ColumnResolver, ColumnRole,
    PartitionCounts, ReconciledAmounts, ResolvedColumns,
};
pub use error::{ClassificationError, CobroError, ExportError, IngestError, PdfError, Result};
pub use invoice::{DocumentExtractor, StatusClassifier};
pub use models::config::CobroConfig;
pub use models::invoice::{ExtractedInvoice, PaymentClass, PaymentStatus};
pub use models::record::{CellValue, RawRecord, RecordSet};
