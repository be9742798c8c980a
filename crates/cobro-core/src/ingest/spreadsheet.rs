//! Workbook tables (xlsx, xls, ods) via calamine.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::{debug, info};

use super::TableReader;
use crate::error::IngestError;
use crate::models::record::{CellValue, RawRecord, RecordSet};

impl TableReader {
    /// Read the first worksheet of a workbook. The first row is the header.
    ///
    /// Numeric cells arrive as numbers, blank cells are absent and fully
    /// blank rows are skipped.
    pub fn read_spreadsheet(&self, data: &[u8]) -> Result<RecordSet, IngestError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;

        let sheet = workbook.sheet_names().first().cloned().unwrap_or_default();
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::MissingHeader)?
            .map_err(|e| IngestError::Spreadsheet(e.to_string()))?;
        debug!("Reading worksheet {:?} ({:?})", sheet, range.get_size());

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Err(IngestError::MissingHeader);
        };

        let mut columns: Vec<String> = Vec::new();
        for (index, cell) in header.iter().enumerate() {
            let raw = cell.to_string();
            let name = self.unique_column_name(&raw, index, |n| columns.iter().any(|c| c == n));
            columns.push(name);
        }

        let mut set = RecordSet::with_columns(columns.clone());
        for row in rows {
            let record: RawRecord = columns
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column.clone(), cell_value(cell)))
                .filter(|(_, value)| !value.is_absent())
                .collect();
            if !record.is_empty() {
                set.push(record);
            }
        }

        info!("Read {} spreadsheet rows with {} columns", set.len(), set.columns().len());
        Ok(set)
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Absent,
        Data::Int(i) => CellValue::from(*i),
        Data::Float(f) => CellValue::from(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Absent,
        Data::String(s) => CellValue::text(s.trim()),
        other => CellValue::text(other.to_string()),
    }
}
