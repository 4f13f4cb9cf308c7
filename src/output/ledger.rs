//! Append-only audit ledgers.
//!
//! A ledger is a workbook recording every validated sheet across repeated
//! runs, keyed by a serial number that continues from the existing maximum
//! and never resets, including across process restarts. Updates are
//! read-modify-write: callers must serialize access per ledger path.

use std::path::{Path, PathBuf};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::warn;

use crate::error::{Result, ToolError};
use crate::io::excel_write::{self, CellValue, SheetTable, WorkbookData};
use crate::model::{LedgerEntry, ValidationRun};
use crate::summary;

/// Columns of a per-folder ledger.
pub const FOLDER_COLUMNS: [&str; 6] = [
    "S.No",
    "File Name",
    "Sheet Name",
    "Hours",
    "Review",
    "Validation Date",
];

/// Columns of the master ledger, which additionally records the versioned
/// subfolder that produced each entry.
pub const MASTER_COLUMNS: [&str; 7] = [
    "S.No",
    "File Name",
    "Sheet Name",
    "Hours",
    "Review",
    "Validation Folder",
    "Validation Date",
];

const LEDGER_SHEET: &str = "Ledger";

/// An audit ledger bound to one workbook path.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    master: bool,
}

impl Ledger {
    pub fn new(path: PathBuf, master: bool) -> Self {
        Self { path, master }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the existing entries. An absent or unreadable ledger yields an
    /// empty list; recovery starts a fresh ledger rather than failing the
    /// whole operation.
    pub fn load_or_empty(&self) -> Vec<LedgerEntry> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.read_entries() {
            Ok(entries) => entries,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "ledger unreadable, starting fresh");
                Vec::new()
            }
        }
    }

    /// The serial the next append batch starts from.
    pub fn next_serial(entries: &[LedgerEntry]) -> u32 {
        entries.iter().map(|entry| entry.serial).max().unwrap_or(0) + 1
    }

    /// Appends one entry per validated sheet and writes the ledger back in
    /// full. Returns the complete entry list after the append.
    pub fn append_run(
        &self,
        run: &ValidationRun,
        folder: Option<&str>,
    ) -> Result<Vec<LedgerEntry>> {
        let mut entries = self.load_or_empty();
        let mut serial = Self::next_serial(&entries);
        let stamp = super::ledger_timestamp();

        for sheet in &run.sheets {
            entries.push(LedgerEntry {
                serial,
                file_name: run.file_name.clone(),
                sheet_name: sheet.name.clone(),
                total_hours: sheet.total_hours(),
                review: summary::review_message(sheet),
                validation_folder: folder.map(str::to_string),
                validated_at: stamp.clone(),
            });
            serial += 1;
        }

        self.persist(&entries)?;
        Ok(entries)
    }

    /// Writes the full entry list to the ledger workbook.
    pub fn persist(&self, entries: &[LedgerEntry]) -> Result<()> {
        let columns: Vec<String> = if self.master {
            MASTER_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            FOLDER_COLUMNS.iter().map(|c| c.to_string()).collect()
        };

        let rows = entries
            .iter()
            .map(|entry| {
                let mut row = vec![
                    CellValue::Number(entry.serial as f64),
                    CellValue::text(&entry.file_name),
                    CellValue::text(&entry.sheet_name),
                    CellValue::Number(entry.total_hours),
                    CellValue::text(&entry.review),
                ];
                if self.master {
                    row.push(CellValue::text(
                        entry.validation_folder.clone().unwrap_or_default(),
                    ));
                }
                row.push(CellValue::text(&entry.validated_at));
                row
            })
            .collect();

        let table = SheetTable {
            sheet_name: LEDGER_SHEET.to_string(),
            columns,
            rows,
        };
        excel_write::write_workbook(&self.path, &WorkbookData { tables: vec![table] })
    }

    fn read_entries(&self) -> Result<Vec<LedgerEntry>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ToolError::InvalidWorkbook("ledger workbook has no sheets".into()))?
            .map_err(ToolError::from)?;

        let mut entries = Vec::new();
        for row in range.rows().skip(1) {
            let Some(serial) = cell_number(row.first()) else {
                warn!(path = %self.path.display(), "skipping ledger row without a serial");
                continue;
            };
            let (folder, date_idx) = if self.master {
                (normalize_optional(cell_string(row.get(5))), 6)
            } else {
                (None, 5)
            };
            entries.push(LedgerEntry {
                serial: serial as u32,
                file_name: cell_string(row.get(1)),
                sheet_name: cell_string(row.get(2)),
                total_hours: cell_number(row.get(3)).unwrap_or(0.0),
                review: cell_string(row.get(4)),
                validation_folder: folder,
                validated_at: cell_string(row.get(date_idx)),
            });
        }
        Ok(entries)
    }
}

fn cell_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_number(cell: Option<&DataType>) -> Option<f64> {
    match cell {
        Some(DataType::Float(value)) => Some(*value),
        Some(DataType::Int(value)) => Some(*value as f64),
        Some(DataType::String(value)) => value.trim().parse().ok(),
        _ => None,
    }
}

fn normalize_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
