//! Calendar-driven monthly template generation.
//!
//! Produces a pre-filled timesheet for a month: weekdays default to an
//! eight-hour working day, weekends to a zero-hour "Weekend" row.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::excel_write::{self, CellValue, SheetTable, WorkbookData};
use crate::output::OutputLayout;

/// Columns of the generated template sheet.
pub const TEMPLATE_COLUMNS: [&str; 5] = ["Date", "Day", "Client", "Sheet Name", "Hours"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> Result<&'static str> {
    MONTH_NAMES
        .get(month as usize - 1)
        .copied()
        .ok_or(ToolError::InvalidMonth(month))
}

/// The month following `today`; December rolls over to January next year.
pub fn next_month(today: NaiveDate) -> (u32, i32) {
    if today.month() == 12 {
        (1, today.year() + 1)
    } else {
        (today.month() + 1, today.year())
    }
}

/// Resolves the requested month and year, defaulting to the next calendar
/// month when no month is given and to the current year when only the month
/// is given.
pub fn resolve_month(
    month: Option<u32>,
    year: Option<i32>,
    today: NaiveDate,
) -> Result<(u32, i32)> {
    match month {
        None => Ok(next_month(today)),
        Some(month) if (1..=12).contains(&month) => Ok((month, year.unwrap_or(today.year()))),
        Some(month) => Err(ToolError::InvalidMonth(month)),
    }
}

/// Number of calendar days in the given month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ToolError::InvalidMonth(month))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(ToolError::InvalidMonth(month))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Builds one row per calendar day of the month.
pub fn build_rows(month: u32, year: i32) -> Result<Vec<Vec<CellValue>>> {
    let days = days_in_month(year, month)?;
    let mut rows = Vec::with_capacity(days as usize);

    for day in 1..=days {
        let date =
            NaiveDate::from_ymd_opt(year, month, day).ok_or(ToolError::InvalidMonth(month))?;
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let (client, hours) = if weekend {
            (CellValue::text("Weekend"), 0.0)
        } else {
            (CellValue::Empty, 8.0)
        };
        rows.push(vec![
            CellValue::Text(date.format("%Y-%m-%d").to_string()),
            CellValue::Text(date.format("%A").to_string()),
            client,
            CellValue::Empty,
            CellValue::Number(hours),
        ]);
    }

    Ok(rows)
}

/// Generates the template workbook in the output directory and returns its
/// path. The single sheet is named `{MonthName} {Year}`.
#[instrument(level = "info", skip(layout))]
pub fn generate(
    layout: &OutputLayout,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<std::path::PathBuf> {
    let (month, year) = resolve_month(month, year, Local::now().date_naive())?;
    let name = month_name(month)?;
    let rows = build_rows(month, year)?;

    let table = SheetTable {
        sheet_name: format!("{name} {year}"),
        columns: TEMPLATE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    };
    let output_path = layout.output_dir.join(format!("Timesheet_{name}_{year}.xlsx"));
    excel_write::write_workbook(&output_path, &WorkbookData { tables: vec![table] })?;
    info!(path = %output_path.display(), "monthly template created");

    Ok(output_path)
}
