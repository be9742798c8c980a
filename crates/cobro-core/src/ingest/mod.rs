//! Tabular ingestion: delimited text, JSON tables and spreadsheets into
//! record sets.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::{CobroError, IngestError};
use crate::models::config::IngestConfig;
use crate::models::record::{CellValue, RawRecord, RecordSet};

#[cfg(feature = "xlsx")]
mod spreadsheet;

/// Normalize a column name: trimmed, lowercase, whitespace runs joined
/// with `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Tabular source formats understood by [`TableReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    /// Workbook; the first worksheet is read.
    Spreadsheet,
}

impl SourceFormat {
    /// Format for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Reads tables into [`RecordSet`]s.
#[derive(Debug, Clone)]
pub struct TableReader {
    delimiters: Vec<u8>,
    normalize_column_names: bool,
}

impl TableReader {
    pub fn new() -> Self {
        Self::from_config(&IngestConfig::default())
    }

    /// Create a reader from configuration. Delimiters outside ASCII are
    /// ignored.
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            delimiters: config
                .delimiters
                .iter()
                .filter(|c| c.is_ascii())
                .map(|&c| c as u8)
                .collect(),
            normalize_column_names: config.normalize_column_names,
        }
    }

    fn column_name(&self, raw: &str, index: usize) -> String {
        let name = if self.normalize_column_names {
            normalize_column_name(raw)
        } else {
            raw.trim().to_string()
        };
        if name.is_empty() {
            format!("column_{}", index + 1)
        } else {
            name
        }
    }

    /// Name for the column at `index`, suffixed `_2`, `_3`, ... while the
    /// name is already taken.
    fn unique_column_name(&self, raw: &str, index: usize, taken: impl Fn(&str) -> bool) -> String {
        let base = self.column_name(raw, index);
        let mut name = base.clone();
        let mut suffix = 2;
        while taken(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        name
    }

    /// Pick the first delimiter that splits the header into more than one
    /// column, falling back to a comma.
    fn sniff_delimiter(&self, text: &str) -> u8 {
        let header = text.lines().next().unwrap_or_default();
        for &delimiter in &self.delimiters {
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .delimiter(delimiter)
                .from_reader(header.as_bytes());
            if let Some(Ok(record)) = reader.records().next() {
                if record.len() > 1 {
                    debug!("Using delimiter {:?}", delimiter as char);
                    return delimiter;
                }
            }
        }
        b','
    }

    /// Read delimited text with a header row.
    ///
    /// Empty cells are absent. Short rows leave their trailing cells absent;
    /// cells beyond the header are dropped.
    pub fn read_csv(&self, text: &str) -> Result<RecordSet, IngestError> {
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(IngestError::MissingHeader);
        }

        let delimiter = self.sniff_delimiter(text);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());

        let mut columns: Vec<String> = Vec::new();
        for (index, raw) in reader.headers()?.iter().enumerate() {
            let name = self.unique_column_name(raw, index, |n| columns.iter().any(|c| c == n));
            columns.push(name);
        }
        if columns.is_empty() {
            return Err(IngestError::MissingHeader);
        }

        let mut set = RecordSet::with_columns(columns.clone());
        for (line, result) in reader.records().enumerate() {
            let row = result?;
            if row.len() > columns.len() {
                debug!("Row {} has {} extra cells", line + 2, row.len() - columns.len());
            }

            let record: RawRecord = columns
                .iter()
                .zip(row.iter())
                .filter(|(_, cell)| !cell.trim().is_empty())
                .map(|(column, cell)| (column.clone(), CellValue::text(cell.trim())))
                .collect();
            set.push(record);
        }

        info!("Read {} rows with {} columns", set.len(), set.columns().len());
        Ok(set)
    }

    /// Read a JSON array of flat objects.
    ///
    /// Keys that normalize to the same column name are kept apart with the
    /// same suffixes as CSV headers.
    pub fn read_json(&self, text: &str) -> Result<RecordSet, IngestError> {
        let records: Vec<RawRecord> = serde_json::from_str(text)?;

        let set = if self.normalize_column_names {
            RecordSet::from_records(records.into_iter().map(|record| {
                let mut renamed = RawRecord::new();
                for (index, (column, value)) in record.iter().enumerate() {
                    let name = self.unique_column_name(column, index, |n| renamed.contains_column(n));
                    renamed.insert(name, value.clone());
                }
                renamed
            }))
        } else {
            RecordSet::from_records(records)
        };

        info!("Read {} JSON rows with {} columns", set.len(), set.columns().len());
        Ok(set)
    }

    /// Read text in the given format.
    pub fn read_str(&self, text: &str, format: SourceFormat) -> Result<RecordSet, IngestError> {
        self.read_bytes(text.as_bytes(), format)
    }

    /// Read raw file contents in the given format. Text formats must be
    /// UTF-8.
    pub fn read_bytes(&self, data: &[u8], format: SourceFormat) -> Result<RecordSet, IngestError> {
        match format {
            SourceFormat::Csv => self.read_csv(std::str::from_utf8(data)?),
            SourceFormat::Json => self.read_json(std::str::from_utf8(data)?),
            #[cfg(feature = "xlsx")]
            SourceFormat::Spreadsheet => self.read_spreadsheet(data),
            #[cfg(not(feature = "xlsx"))]
            SourceFormat::Spreadsheet => Err(IngestError::UnsupportedFormat(
                "spreadsheet support is disabled".to_string(),
            )),
        }
    }

    /// Read a table file, choosing the format from its extension.
    pub fn read_file(&self, path: &Path) -> crate::Result<RecordSet> {
        let format = SourceFormat::from_path(path).ok_or_else(|| {
            IngestError::UnsupportedFormat(path.display().to_string())
        })?;
        let data = std::fs::read(path).map_err(CobroError::Io)?;
        debug!("Reading {} as {:?}", path.display(), format);
        Ok(self.read_bytes(&data, format)?)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}
