//! Reads raw sheets from an Excel workbook via calamine.
//!
//! Cells are converted to [`RawCell`] values without interpretation; all
//! schema mapping and rule evaluation happens downstream. Native Excel date
//! cells are resolved to calendar dates here so later stages never see
//! serial numbers.

use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate};

use crate::error::{Result, ToolError};
use crate::model::RawCell;

/// One sheet of an input workbook: the header row plus the data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// Reads every sheet of the workbook at `path`, preserving sheet order.
pub fn read_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = read_sheet_range(&mut workbook, &name)?;
        sheets.push(build_sheet(name, &range));
    }
    Ok(sheets)
}

fn read_sheet_range<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn build_sheet(name: String, range: &calamine::Range<DataType>) -> RawSheet {
    let headers: Vec<String> = match range.rows().next() {
        Some(first_row) => first_row.iter().map(cell_to_header).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .skip(1)
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    RawSheet {
        name,
        headers,
        rows,
    }
}

fn cell_to_header(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::String(value) => RawCell::Text(value.clone()),
        DataType::Float(value) => RawCell::Number(*value),
        DataType::Int(value) => RawCell::Number(*value as f64),
        DataType::Bool(value) => RawCell::Bool(*value),
        DataType::DateTime(serial) => match serial_to_date(*serial) {
            Some(date) => RawCell::Date(date),
            None => RawCell::Number(*serial),
        },
        DataType::Empty => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}

/// Converts an Excel serial date (days since 1899-12-30) to a calendar date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_resolve_against_the_1900_epoch() {
        assert_eq!(
            serial_to_date(45297.0),
            NaiveDate::from_ymd_opt(2024, 1, 6)
        );
        assert_eq!(serial_to_date(-1.0), None);
    }

    #[test]
    fn cells_convert_without_interpretation() {
        assert_eq!(
            convert_cell(&DataType::String("AcmeCo".into())),
            RawCell::Text("AcmeCo".into())
        );
        assert_eq!(convert_cell(&DataType::Float(7.5)), RawCell::Number(7.5));
        assert_eq!(convert_cell(&DataType::Int(8)), RawCell::Number(8.0));
        assert_eq!(convert_cell(&DataType::Empty), RawCell::Empty);
    }
}
