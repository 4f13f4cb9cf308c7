//! Per-row attendance rules.
//!
//! Every raw row yields exactly one classified entry; unparseable data
//! degrades into lenient states (null date, invalid-hours status) instead of
//! raising errors. The weekend flag is computed from the parsed date
//! independently of, and before, status classification, so a leave-type row
//! on a weekend can carry both the flag and a leave status.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::model::{
    FLAG_BLANK_DESCRIPTION, FLAG_HALF_DAY, FLAG_WEEKEND, Hours, RawCell, STATUS_HALF_DAY,
    STATUS_INVALID_HOURS, STATUS_LEAVE_MISUSE, STATUS_MISSING_HOURS, STATUS_VALID, TimesheetEntry,
    format_hours,
};
use crate::schema::CanonicalRow;

const LEAVE_MARKERS: [&str; 3] = ["leave", "holiday", "weekend"];

/// Classifies one canonical row into a [`TimesheetEntry`].
pub fn classify(row: &CanonicalRow) -> TimesheetEntry {
    let mut entry = TimesheetEntry {
        client: row.client.trim().to_string(),
        date: parse_date(&row.date),
        description: row.description.trim().to_string(),
        hours: Hours::from_cell(&row.hours),
        status: STATUS_VALID.to_string(),
        flags: Vec::new(),
    };

    if is_weekend(entry.date) && entry.hours.is_filled() {
        entry.add_flag(FLAG_WEEKEND);
    }

    if is_leave_type(&entry.client) {
        // Only a blank cell or a numeric zero is a correctly logged leave
        // day; non-numeric text counts as misuse even when it spells "0".
        let misuse = match &entry.hours {
            Hours::Empty => false,
            Hours::Numeric(value) => *value != 0.0,
            Hours::Invalid(_) => true,
        };
        if misuse {
            entry.status = STATUS_LEAVE_MISUSE.to_string();
        }
    } else {
        match &entry.hours {
            Hours::Empty => entry.status = STATUS_MISSING_HOURS.to_string(),
            Hours::Numeric(value) if *value == 4.0 => {
                entry.status = STATUS_HALF_DAY.to_string();
                entry.add_flag(FLAG_HALF_DAY);
            }
            Hours::Numeric(value) if *value == 8.0 => {}
            Hours::Numeric(value) => {
                entry.status = format!(
                    "Full working day should be 8 hrs, found {} hrs",
                    format_hours(*value)
                );
            }
            Hours::Invalid(_) => entry.status = STATUS_INVALID_HOURS.to_string(),
        }
    }

    if entry.description.is_empty() {
        entry.add_flag(FLAG_BLANK_DESCRIPTION);
    }

    entry
}

/// Whether the client text marks a non-working day.
pub fn is_leave_type(client: &str) -> bool {
    let lowered = client.to_lowercase();
    LEAVE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

fn is_weekend(date: Option<NaiveDate>) -> bool {
    matches!(
        date.map(|d| d.weekday()),
        Some(Weekday::Sat) | Some(Weekday::Sun)
    )
}

/// Date formats accepted for text cells, tried in order.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Resolves a date cell to a calendar date, `None` on failure. Native Excel
/// date cells are taken as-is; text cells are parsed leniently.
pub fn parse_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(date) => Some(*date),
        RawCell::Text(text) => parse_date_text(text.trim()),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}
