//! Rolls validated sheets into the review summary.
//!
//! The same review-message derivation feeds the per-run summary workbook and
//! the audit ledgers, so a sheet is always described identically wherever it
//! is recorded.

use crate::model::{
    FLAG_BLANK_DESCRIPTION, FLAG_WEEKEND, STATUS_HALF_DAY, STATUS_INVALID_HOURS,
    STATUS_LEAVE_MISUSE, STATUS_MISSING_HOURS, STATUS_NON_STANDARD_PREFIX, SummaryRow,
    ValidatedSheet,
};

/// Builds the human-readable review for one sheet. Conditions are checked in
/// fixed order; each present condition contributes one phrase.
pub fn review_message(sheet: &ValidatedSheet) -> String {
    let mut issues: Vec<&str> = Vec::new();
    let entries = &sheet.entries;

    if entries.iter().any(|e| e.status == STATUS_HALF_DAY) {
        issues.push("Contains half-days");
    }
    if entries
        .iter()
        .any(|e| e.status.starts_with(STATUS_NON_STANDARD_PREFIX))
    {
        issues.push("Has non-standard hours");
    }
    if entries.iter().any(|e| e.status == STATUS_LEAVE_MISUSE) {
        issues.push("Incorrectly logged leave/holiday");
    }
    if entries.iter().any(|e| e.status == STATUS_MISSING_HOURS) {
        issues.push("Missing hours entries");
    }
    if entries.iter().any(|e| e.status == STATUS_INVALID_HOURS) {
        issues.push("Invalid hour format");
    }
    if entries.iter().any(|e| e.has_flag(FLAG_BLANK_DESCRIPTION)) {
        issues.push("Has blank descriptions");
    }
    if entries.iter().any(|e| e.has_flag(FLAG_WEEKEND)) {
        issues.push("Contains weekend entries");
    }

    if issues.is_empty() {
        "OK".to_string()
    } else {
        issues.join(", ")
    }
}

/// Produces one [`SummaryRow`] per sheet plus the trailing total row.
pub fn build_summary(file_name: &str, sheets: &[ValidatedSheet]) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = sheets
        .iter()
        .enumerate()
        .map(|(index, sheet)| SummaryRow {
            serial: Some(index as u32 + 1),
            file_name: file_name.to_string(),
            sheet_name: sheet.name.clone(),
            total_hours: sheet.total_hours(),
            review: review_message(sheet),
        })
        .collect();

    let grand_total: f64 = rows.iter().map(|row| row.total_hours).sum();
    rows.push(SummaryRow {
        serial: None,
        file_name: "Total".to_string(),
        sheet_name: String::new(),
        total_hours: grand_total,
        review: String::new(),
    });

    rows
}
