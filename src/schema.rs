//! Maps heterogeneous column headers onto the canonical timesheet schema.
//!
//! Input sheets arrive with arbitrary headers; downstream rules only care
//! about four semantic columns. Any column may be entirely absent, in which
//! case every row sees a blank cell for it. Unmapped columns are ignored.

use crate::io::excel_read::RawSheet;
use crate::model::RawCell;

/// One row of a sheet projected onto the canonical columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub client: String,
    pub date: RawCell,
    pub description: String,
    pub hours: RawCell,
}

/// Resolved indices of the canonical columns within a sheet's header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub client: Option<usize>,
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub hours: Option<usize>,
}

impl ColumnMap {
    /// Matches headers case-insensitively. The hours column tolerates any
    /// header containing "Duration (in hrs)" or "Hours"; the others match by
    /// name. The first matching header wins.
    pub fn resolve(headers: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (index, header) in headers.iter().enumerate() {
            let lowered = header.trim().to_lowercase();
            if map.hours.is_none()
                && (lowered.contains("duration (in hrs)") || lowered.contains("hours"))
            {
                map.hours = Some(index);
            } else if map.client.is_none() && lowered == "client" {
                map.client = Some(index);
            } else if map.date.is_none() && lowered == "date" {
                map.date = Some(index);
            } else if map.description.is_none() && lowered == "description" {
                map.description = Some(index);
            }
        }
        map
    }
}

/// Projects every row of the sheet onto the canonical columns. Pure
/// transform; absent columns yield blank cells rather than errors.
pub fn normalize(sheet: &RawSheet) -> Vec<CanonicalRow> {
    let map = ColumnMap::resolve(&sheet.headers);
    sheet
        .rows
        .iter()
        .map(|row| CanonicalRow {
            client: text_at(row, map.client),
            date: cell_at(row, map.date),
            description: text_at(row, map.description),
            hours: cell_at(row, map.hours),
        })
        .collect()
}

fn cell_at(row: &[RawCell], index: Option<usize>) -> RawCell {
    index
        .and_then(|idx| row.get(idx))
        .cloned()
        .unwrap_or(RawCell::Empty)
}

fn text_at(row: &[RawCell], index: Option<usize>) -> String {
    cell_at(row, index).as_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn hours_header_matches_by_substring() {
        let map = ColumnMap::resolve(&headers(&["Client", "Duration (in hrs)"]));
        assert_eq!(map.hours, Some(1));
        let map = ColumnMap::resolve(&headers(&["Client", "Total Hours"]));
        assert_eq!(map.hours, Some(1));
        let map = ColumnMap::resolve(&headers(&["Client", "hours worked"]));
        assert_eq!(map.hours, Some(1));
    }

    #[test]
    fn named_columns_match_case_insensitively() {
        let map = ColumnMap::resolve(&headers(&["client", "DATE", "Description", "Hours"]));
        assert_eq!(map.client, Some(0));
        assert_eq!(map.date, Some(1));
        assert_eq!(map.description, Some(2));
        assert_eq!(map.hours, Some(3));
    }

    #[test]
    fn missing_columns_become_blank_cells() {
        let sheet = RawSheet {
            name: "Week 1".into(),
            headers: headers(&["Notes"]),
            rows: vec![vec![RawCell::Text("irrelevant".into())]],
        };
        let rows = normalize(&sheet);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client, "");
        assert_eq!(rows[0].date, RawCell::Empty);
        assert_eq!(rows[0].hours, RawCell::Empty);
    }

    #[test]
    fn unmapped_columns_are_ignored() {
        let sheet = RawSheet {
            name: "Week 1".into(),
            headers: headers(&["Client", "Project Code", "Hours"]),
            rows: vec![vec![
                RawCell::Text("AcmeCo".into()),
                RawCell::Text("X-17".into()),
                RawCell::Number(8.0),
            ]],
        };
        let rows = normalize(&sheet);
        assert_eq!(rows[0].client, "AcmeCo");
        assert_eq!(rows[0].hours, RawCell::Number(8.0));
    }
}
