//! Workbook export: one worksheet per partition.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::classify::Classification;
use crate::error::ExportError;
use crate::models::record::{CellValue, RecordSet, exact_f64};

fn workbook_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Workbook(e.to_string())
}

/// Build the workbook for a classification: sheets `paid`, `partial`,
/// `unpaid` and `unclassified`, each with a bold header row in schema
/// order.
pub fn build_workbook(result: &Classification) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for (name, set) in result.named_partitions() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(workbook_error)?;
        write_sheet(sheet, set, &header)?;
        debug!("Sheet {} has {} rows", name, set.len());
    }

    Ok(workbook)
}

/// Serialize the workbook to xlsx bytes.
pub fn workbook_bytes(result: &Classification) -> Result<Vec<u8>, ExportError> {
    build_workbook(result)?
        .save_to_buffer()
        .map_err(workbook_error)
}

/// Write the workbook to `path`.
pub fn write_workbook(result: &Classification, path: &Path) -> Result<(), ExportError> {
    build_workbook(result)?.save(path).map_err(workbook_error)
}

fn write_sheet(sheet: &mut Worksheet, set: &RecordSet, header: &Format) -> Result<(), ExportError> {
    let columns = set
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            u16::try_from(index)
                .map(|col| (col, name))
                .map_err(|_| workbook_error(format!("too many columns ({})", set.columns().len())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for &(col, name) in &columns {
        sheet
            .write_string_with_format(0, col, name.as_str(), header)
            .map_err(workbook_error)?;
    }

    for (index, record) in set.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| workbook_error(format!("too many rows ({})", set.len())))?;

        for &(col, name) in &columns {
            match record.value(name) {
                CellValue::Absent => {}
                // Numbers a float cannot hold stay text so no digit is lost
                CellValue::Number(n) => match exact_f64(n) {
                    Some(f) => {
                        sheet.write_number(row, col, f).map_err(workbook_error)?;
                    }
                    None => {
                        sheet
                            .write_string(row, col, n.normalize().to_string())
                            .map_err(workbook_error)?;
                    }
                },
                CellValue::Text(s) => {
                    sheet.write_string(row, col, s.as_str()).map_err(workbook_error)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationEngine;
    use crate::models::record::RawRecord;
    use calamine::{Data, Reader, open_workbook_auto_from_rs};
    use std::io::Cursor;

    fn classification() -> Classification {
        let records = RecordSet::from_records(vec![
            RawRecord::new().with("cliente", "A").with("total", 100i64).with("pagado", 100i64),
            RawRecord::new().with("cliente", "B").with("total", 100i64).with("pagado", 40i64),
            RawRecord::new().with("cliente", "C").with("total", 100i64).with("pagado", 0i64),
        ]);
        ClassificationEngine::new().classify(&records).unwrap()
    }

    #[test]
    fn test_workbook_has_one_sheet_per_partition() {
        let data = workbook_bytes(&classification()).unwrap();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data)).unwrap();

        assert_eq!(workbook.sheet_names(), ["paid", "partial", "unpaid", "unclassified"]);

        let partial = workbook.worksheet_range_at(1).unwrap().unwrap();
        assert_eq!(partial.get_value((0, 5)), Some(&Data::String("Pending".to_string())));
        assert_eq!(partial.get_value((1, 0)), Some(&Data::String("B".to_string())));
        assert_eq!(partial.get_value((1, 5)), Some(&Data::Float(60.0)));

        let unclassified = workbook.worksheet_range_at(3).unwrap().unwrap();
        assert_eq!(unclassified.get_value((0, 0)), Some(&Data::String("cliente".to_string())));
        assert_eq!(unclassified.get_value((1, 0)), None);
    }

    #[test]
    fn test_write_workbook_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("classification.xlsx");

        write_workbook(&classification(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
