//! Input discovery and loading: tables and documents into one record set.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use cobro_core::ingest::{SourceFormat, TableReader};
use cobro_core::pdf;
use cobro_core::{DocumentExtractor, ExtractedInvoice, RecordSet};

/// Kind of input a file is handled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Table(SourceFormat),
    Pdf,
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "txt" => Some(SourceKind::Text),
            other => SourceFormat::from_extension(other).map(SourceKind::Table),
        }
    }

    pub fn is_document(&self) -> bool {
        !matches!(self, SourceKind::Table(_))
    }
}

/// Expand input paths and glob patterns into supported files, in argument
/// order and without duplicates.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let matches: Vec<PathBuf> = glob(input)?.filter_map(|r| r.ok()).collect();
        if matches.is_empty() {
            anyhow::bail!("No matching files found for pattern: {}", input);
        }

        for path in matches {
            if SourceKind::from_path(&path).is_none() {
                debug!("Skipping unsupported file {}", path.display());
                continue;
            }
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("No supported input files (csv, tsv, json, xlsx, xls, ods, pdf, txt)");
    }

    Ok(files)
}

/// Page texts of a document. Plain text files split pages on form feeds.
pub fn document_pages(path: &Path, kind: SourceKind) -> anyhow::Result<Vec<String>> {
    match kind {
        SourceKind::Pdf => {
            let data = fs::read(path)?;
            Ok(pdf::page_texts(&data)?)
        }
        SourceKind::Text => {
            let text = fs::read_to_string(path)?;
            Ok(text.split('\u{c}').map(str::to_string).collect())
        }
        SourceKind::Table(_) => anyhow::bail!("{} is not a document", path.display()),
    }
}

/// Extract the invoice held in a document file.
pub fn extract_document(
    path: &Path,
    extractor: &DocumentExtractor,
) -> anyhow::Result<ExtractedInvoice> {
    let kind = SourceKind::from_path(path)
        .filter(SourceKind::is_document)
        .ok_or_else(|| anyhow::anyhow!("Unsupported document format: {}", path.display()))?;

    let pages = document_pages(path, kind)?;
    debug!("{} has {} pages", path.display(), pages.len());
    Ok(extractor.extract(&pages))
}

/// Load one input file as a record set.
pub fn load_source(
    path: &Path,
    reader: &TableReader,
    extractor: &DocumentExtractor,
) -> anyhow::Result<RecordSet> {
    match SourceKind::from_path(path) {
        Some(SourceKind::Table(_)) => Ok(reader.read_file(path)?),
        Some(_) => {
            let invoice = extract_document(path, extractor)?;
            Ok(RecordSet::from_records([invoice.to_record()]))
        }
        None => anyhow::bail!("Unsupported file format: {}", path.display()),
    }
}
