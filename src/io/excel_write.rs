//! Writes tabular workbook data via rust_xlsxwriter.

use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::error::Result;

/// A cell destined for an output workbook. Hours stay numeric so Excel can
/// sum them; everything else is text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Represents all tables required to materialise an Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Writes the provided workbook data to the given path.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    CellValue::Text(value) => {
                        worksheet.write_string((row_idx + 1) as u32, col_idx as u16, value)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number((row_idx + 1) as u32, col_idx as u16, *value)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }

        let table_columns: Vec<TableColumn> = table
            .columns
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true).set_columns(&table_columns);

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = if table.rows.is_empty() {
            0
        } else {
            table.rows.len() as u32
        };
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::excel_read;
    use crate::model::RawCell;
    use tempfile::tempdir;

    #[test]
    fn typed_cells_and_headers_survive_a_round_trip() {
        let temp = tempdir().expect("temporary directory");
        let path = temp.path().join("table.xlsx");

        let table = SheetTable {
            sheet_name: "Week 1".to_string(),
            columns: vec!["Client".to_string(), "Hours".to_string()],
            rows: vec![
                vec![CellValue::text("AcmeCo"), CellValue::Number(7.5)],
                vec![CellValue::Empty, CellValue::Empty],
            ],
        };
        write_workbook(&path, &WorkbookData { tables: vec![table] })
            .expect("workbook written");

        let sheets = excel_read::read_sheets(&path).expect("workbook read");
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].headers, vec!["Client", "Hours"]);
        assert_eq!(sheets[0].rows[0][0], RawCell::Text("AcmeCo".into()));
        assert_eq!(sheets[0].rows[0][1], RawCell::Number(7.5));
    }
}
