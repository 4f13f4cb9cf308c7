//! Versioned output management: directory layout, timestamped run folders,
//! audit ledgers, archive snapshots, zip bundles, and monthly templates.
//!
//! Each run writes into its own timestamped subfolder and never touches
//! another run's artifacts. Ledger files are the only shared state; their
//! read-modify-write cycle assumes at most one writer per ledger path.

pub mod ledger;
pub mod template;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, instrument, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Result, ToolError};
use crate::io::excel_write::{self, CellValue, SheetTable, WorkbookData};
use crate::model::{Hours, SummaryRow, ValidatedSheet, ValidationRun};
use ledger::Ledger;

/// Summary workbook name inside a run folder, also the per-folder ledger
/// name in the base validation directory.
pub const SUMMARY_FILE_NAME: &str = "validation_summary.xlsx";
/// Master ledger name, always in the base validation directory.
pub const MASTER_LEDGER_FILE: &str = "master_validation_summary.xlsx";
/// Fixed name of the summary entry inside zip bundles.
pub const ZIP_SUMMARY_NAME: &str = "Validation_Summary.xlsx";

/// Columns of a validated output sheet.
pub const VALIDATED_COLUMNS: [&str; 6] = ["Client", "Date", "Sheet Name", "Hours", "Status", "Flag"];
/// Columns of the summary workbook.
pub const SUMMARY_COLUMNS: [&str; 5] = ["S.No", "File Name", "Sheet Name", "Hours", "Review"];

/// Immutable description of where outputs live. Constructing it creates the
/// directories; creation is idempotent and safe to race.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub validation_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
        validation_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let layout = Self {
            output_dir: output_dir.into(),
            archive_dir: archive_dir.into(),
            validation_dir: validation_dir.into(),
        };
        for dir in [
            &layout.output_dir,
            &layout.archive_dir,
            &layout.validation_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(layout)
    }

    /// Resolves the directory a run should write into: the base validation
    /// directory, or the `validation{N}` subfolder when a number is given.
    /// Creates it if absent.
    pub fn resolve_validation_dir(&self, validation_number: Option<u32>) -> Result<PathBuf> {
        let dir = match validation_number {
            Some(number) => self.validation_dir.join(format!("validation{number}")),
            None => self.validation_dir.clone(),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path of the per-folder ledger for the given validation directory.
    fn folder_ledger_path(&self, validation_dir: &Path) -> PathBuf {
        if validation_dir == self.validation_dir {
            validation_dir.join(SUMMARY_FILE_NAME)
        } else {
            let folder = validation_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            validation_dir.join(format!("{folder}_summary.xlsx"))
        }
    }
}

/// Timestamp used in file and folder names; sortable, second resolution.
pub(crate) fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Timestamp recorded in ledger cells.
pub(crate) fn ledger_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Persists one validated run: a uniquely timestamped subfolder holding the
/// validated workbook and its summary, plus ledger appends. The master
/// ledger is only touched when a validation number was given. Returns the
/// validated workbook path.
#[instrument(level = "info", skip_all, fields(file = %run.file_name, validation_number))]
pub fn save_validated(
    layout: &OutputLayout,
    run: &ValidationRun,
    validation_number: Option<u32>,
) -> Result<PathBuf> {
    let validation_dir = layout.resolve_validation_dir(validation_number)?;
    let subfolder =
        create_unique_run_dir(&validation_dir, &format!("validation_{}", file_timestamp()))?;

    let summary_path = subfolder.join(SUMMARY_FILE_NAME);
    excel_write::write_workbook(
        &summary_path,
        &WorkbookData {
            tables: vec![summary_table(&run.summary)],
        },
    )?;

    let output_path = subfolder.join(&run.file_name);
    let tables: Vec<SheetTable> = run.sheets.iter().map(sheet_table).collect();
    excel_write::write_workbook(&output_path, &WorkbookData { tables })?;
    info!(path = %output_path.display(), "validated workbook saved");

    let folder_ledger = Ledger::new(layout.folder_ledger_path(&validation_dir), false);
    folder_ledger.append_run(run, None)?;

    if validation_number.is_some() {
        let folder_name = validation_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let master = Ledger::new(layout.validation_dir.join(MASTER_LEDGER_FILE), true);
        master.append_run(run, Some(&folder_name))?;
    }

    Ok(output_path)
}

/// Bundles a validated workbook and its sibling summary into a zip archive
/// in the output directory. A missing summary degrades to a single-entry
/// bundle with a warning.
#[instrument(level = "info", skip_all, fields(file = %file_path.display()))]
pub fn zip_validated(layout: &OutputLayout, file_path: &Path) -> Result<PathBuf> {
    if !file_path.exists() {
        return Err(ToolError::MissingInput(file_path.to_path_buf()));
    }

    let stem = file_stem(file_path);
    let zip_path = layout
        .output_dir
        .join(format!("{stem}_{}.zip", file_timestamp()));

    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    zip.start_file(validated_entry_name(file_path), zip_options())?;
    std::io::copy(&mut fs::File::open(file_path)?, &mut zip)?;

    let summary_path = file_path
        .parent()
        .map(|parent| parent.join(SUMMARY_FILE_NAME));
    match summary_path {
        Some(path) if path.exists() => {
            zip.start_file(ZIP_SUMMARY_NAME, zip_options())?;
            std::io::copy(&mut fs::File::open(&path)?, &mut zip)?;
        }
        _ => warn!("summary workbook not found beside validated file, bundling it alone"),
    }

    zip.finish()?;
    info!(path = %zip_path.display(), "zip bundle created");
    Ok(zip_path)
}

/// Copies an existing file into the archive directory under a timestamped
/// name. The source is never mutated or removed. Returns the unchanged
/// original path and the new archive path.
#[instrument(level = "info", skip_all, fields(file = %file_path.display()))]
pub fn archive_snapshot(layout: &OutputLayout, file_path: &Path) -> Result<(PathBuf, PathBuf)> {
    if !file_path.exists() {
        return Err(ToolError::MissingInput(file_path.to_path_buf()));
    }

    let stem = file_stem(file_path);
    let archive_name = match file_path.extension() {
        Some(ext) => format!("{stem}_v{}.{}", file_timestamp(), ext.to_string_lossy()),
        None => format!("{stem}_v{}", file_timestamp()),
    };
    let archive_path = layout.archive_dir.join(archive_name);
    fs::copy(file_path, &archive_path)?;
    info!(path = %archive_path.display(), "snapshot archived");

    Ok((file_path.to_path_buf(), archive_path))
}

/// Creates a run folder that no other run owns. Two runs inside the same
/// second keep the timestamped base name and disambiguate with a numeric
/// suffix; an existing folder is never reused.
fn create_unique_run_dir(parent: &Path, base_name: &str) -> Result<PathBuf> {
    let mut candidate = parent.join(base_name);
    let mut counter = 1;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = parent.join(format!("{base_name}_{counter}"));
                counter += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }
}

fn zip_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Entry name of the validated workbook inside a zip bundle.
fn validated_entry_name(path: &Path) -> String {
    let stem = file_stem(path);
    match path.extension() {
        Some(ext) => format!("{stem}_validated.{}", ext.to_string_lossy()),
        None => format!("{stem}_validated"),
    }
}

/// Materialises one validated sheet as an output table.
fn sheet_table(sheet: &ValidatedSheet) -> SheetTable {
    let rows = sheet
        .entries
        .iter()
        .map(|entry| {
            vec![
                CellValue::text(&entry.client),
                match entry.date_cell() {
                    cell if cell.is_empty() => CellValue::Empty,
                    cell => CellValue::Text(cell),
                },
                CellValue::text(&entry.description),
                hours_cell(&entry.hours),
                CellValue::text(&entry.status),
                CellValue::text(entry.flag_cell()),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: sheet.name.clone(),
        columns: VALIDATED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// Materialises the summary rows (including the trailing total) as a table.
fn summary_table(rows: &[SummaryRow]) -> SheetTable {
    let rows = rows
        .iter()
        .map(|row| {
            vec![
                match row.serial {
                    Some(serial) => CellValue::Number(serial as f64),
                    None => CellValue::Empty,
                },
                CellValue::text(&row.file_name),
                CellValue::text(&row.sheet_name),
                CellValue::Number(row.total_hours),
                CellValue::text(&row.review),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: "Summary".to_string(),
        columns: SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn hours_cell(hours: &Hours) -> CellValue {
    match hours {
        Hours::Numeric(value) => CellValue::Number(*value),
        Hours::Empty => CellValue::Empty,
        Hours::Invalid(raw) => CellValue::Text(raw.clone()),
    }
}
