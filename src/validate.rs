//! Whole-workbook validation orchestration.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::classify;
use crate::error::{Result, ToolError};
use crate::io::excel_read;
use crate::model::{ValidatedSheet, ValidationRun};
use crate::schema;
use crate::summary;

/// Validates every sheet of the workbook at `path` and assembles the run
/// summary. An unreadable or corrupt workbook is a fatal error for the whole
/// run; no partial output is produced. Row-level anomalies never fail the
/// run, they surface as status and flag values.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn validate_workbook(path: &Path) -> Result<ValidationRun> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let raw_sheets = excel_read::read_sheets(path)?;
    info!(sheet_count = raw_sheets.len(), "loaded workbook");

    let mut sheets = Vec::with_capacity(raw_sheets.len());
    for raw in &raw_sheets {
        let rows = schema::normalize(raw);
        let entries: Vec<_> = rows.iter().map(classify::classify).collect();
        debug!(sheet = %raw.name, row_count = entries.len(), "sheet classified");
        sheets.push(ValidatedSheet {
            name: raw.name.clone(),
            entries,
        });
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let summary = summary::build_summary(&file_name, &sheets);

    Ok(ValidationRun {
        file_path: path.to_path_buf(),
        file_name,
        sheets,
        summary,
    })
}
