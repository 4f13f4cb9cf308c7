use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status assigned to rows that satisfy the attendance rules.
pub const STATUS_VALID: &str = "Valid";
/// Status for leave-type rows carrying non-zero hours.
pub const STATUS_LEAVE_MISUSE: &str = "Leave/Holiday should be 0 or empty";
/// Status for working rows with no hours at all.
pub const STATUS_MISSING_HOURS: &str = "Missing hours for a working day";
/// Status for working rows logging exactly four hours.
pub const STATUS_HALF_DAY: &str = "Half-day detected";
/// Status for working rows whose hours cell is not numeric.
pub const STATUS_INVALID_HOURS: &str = "Invalid Hours Format";
/// Prefix of the status for working rows with numeric hours other than 4 or 8.
/// The full message embeds the offending value.
pub const STATUS_NON_STANDARD_PREFIX: &str = "Full working day should be 8 hrs";

/// Flag appended to weekend rows that carry hours.
pub const FLAG_WEEKEND: &str = "Weekend filled";
/// Flag appended alongside the half-day status.
pub const FLAG_HALF_DAY: &str = "Half-Day Alert";
/// Flag appended to rows with an empty description.
pub const FLAG_BLANK_DESCRIPTION: &str = "Blank Description";

/// A single spreadsheet cell as read from an input workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Text content, untrimmed.
    Text(String),
    /// Numeric content (Excel stores all numbers as floats).
    Number(f64),
    /// Native Excel date cell, already resolved to a calendar date.
    Date(NaiveDate),
    /// Boolean cell.
    Bool(bool),
    /// Blank or error cell.
    Empty,
}

impl RawCell {
    /// Returns the cell content as display text, empty for blank cells.
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Text(value) => value.clone(),
            RawCell::Number(value) => format_hours(*value),
            RawCell::Date(value) => value.format("%Y-%m-%d").to_string(),
            RawCell::Bool(value) => value.to_string(),
            RawCell::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

/// Hours logged against one row. Excel cells are duck-typed, so the value is
/// kept as a tagged union and every rule switches on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Hours {
    /// A numeric cell.
    Numeric(f64),
    /// A blank cell.
    Empty,
    /// A non-numeric cell, carrying the raw text for human review.
    Invalid(String),
}

impl Hours {
    /// Builds an [`Hours`] value from a raw cell.
    pub fn from_cell(cell: &RawCell) -> Self {
        match cell {
            RawCell::Number(value) => Hours::Numeric(*value),
            RawCell::Empty => Hours::Empty,
            RawCell::Text(value) if value.trim().is_empty() => Hours::Empty,
            other => Hours::Invalid(other.as_text()),
        }
    }

    /// Returns the numeric value when present.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Hours::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the cell counts as "present and non-zero" for the weekend
    /// flag. Non-numeric text counts as filled unless it is literally `0`.
    /// The leave rule is stricter and treats any non-numeric text as misuse.
    pub fn is_filled(&self) -> bool {
        match self {
            Hours::Numeric(value) => *value != 0.0,
            Hours::Invalid(raw) => raw.trim() != "0",
            Hours::Empty => false,
        }
    }
}

/// Formats an hours value the way it appears in status messages and cells:
/// integral values print without a decimal point.
pub fn format_hours(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One classified timesheet row. Immutable once classified within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub client: String,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub hours: Hours,
    pub status: String,
    pub flags: Vec<String>,
}

impl TimesheetEntry {
    /// Appends a flag. Flags accumulate and are never overwritten.
    pub fn add_flag(&mut self, flag: &str) {
        if !self.flags.iter().any(|existing| existing == flag) {
            self.flags.push(flag.to_string());
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|existing| existing == flag)
    }

    /// Renders the accumulated flags for the output workbook.
    pub fn flag_cell(&self) -> String {
        self.flags.join("; ")
    }

    /// Renders the normalised date, empty when parsing failed.
    pub fn date_cell(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// The validated rows of one input sheet, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedSheet {
    pub name: String,
    pub entries: Vec<TimesheetEntry>,
}

impl ValidatedSheet {
    /// Sum of the numeric hours; missing and invalid cells contribute 0.
    pub fn total_hours(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|entry| entry.hours.numeric())
            .sum()
    }
}

/// One row of the review summary. The trailing total row has no serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub serial: Option<u32>,
    pub file_name: String,
    pub sheet_name: String,
    pub total_hours: f64,
    pub review: String,
}

/// One row of an audit ledger. Serial numbers continue from the existing
/// maximum within a ledger file and never reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub serial: u32,
    pub file_name: String,
    pub sheet_name: String,
    pub total_hours: f64,
    pub review: String,
    /// Versioned subfolder that produced the entry; master ledger only.
    pub validation_folder: Option<String>,
    pub validated_at: String,
}

/// The outcome of validating one workbook. Only successful runs are ever
/// constructed; a failed parse surfaces as an error instead, so failed runs
/// can never reach persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub file_path: PathBuf,
    pub file_name: String,
    pub sheets: Vec<ValidatedSheet>,
    pub summary: Vec<SummaryRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_tags_follow_cell_content() {
        assert_eq!(Hours::from_cell(&RawCell::Number(8.0)), Hours::Numeric(8.0));
        assert_eq!(Hours::from_cell(&RawCell::Empty), Hours::Empty);
        assert_eq!(
            Hours::from_cell(&RawCell::Text("  ".into())),
            Hours::Empty
        );
        assert_eq!(
            Hours::from_cell(&RawCell::Text("eight".into())),
            Hours::Invalid("eight".into())
        );
    }

    #[test]
    fn filled_excludes_zero_in_any_representation() {
        assert!(Hours::Numeric(4.0).is_filled());
        assert!(Hours::Invalid("4h".into()).is_filled());
        assert!(!Hours::Numeric(0.0).is_filled());
        assert!(!Hours::Invalid("0".into()).is_filled());
        assert!(!Hours::Empty.is_filled());
    }

    #[test]
    fn hours_format_drops_trailing_zero() {
        assert_eq!(format_hours(4.0), "4");
        assert_eq!(format_hours(7.5), "7.5");
    }

    #[test]
    fn flags_accumulate_without_duplicates() {
        let mut entry = TimesheetEntry {
            client: String::new(),
            date: None,
            description: String::new(),
            hours: Hours::Empty,
            status: STATUS_VALID.to_string(),
            flags: Vec::new(),
        };
        entry.add_flag(FLAG_WEEKEND);
        entry.add_flag(FLAG_HALF_DAY);
        entry.add_flag(FLAG_WEEKEND);
        assert_eq!(entry.flag_cell(), "Weekend filled; Half-Day Alert");
    }
}
