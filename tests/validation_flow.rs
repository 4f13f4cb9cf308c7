use std::fs::File;
use std::path::Path;

use tempfile::tempdir;
use timesheet_tools::io::excel_read;
use timesheet_tools::io::excel_write::{self, CellValue, SheetTable, WorkbookData};
use timesheet_tools::model::RawCell;
use timesheet_tools::output::{self, OutputLayout, ledger::Ledger, template};
use timesheet_tools::validate;

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn write_input_workbook(path: &Path) {
    let jan = SheetTable {
        sheet_name: "Jan".to_string(),
        columns: vec![
            "Client".to_string(),
            "Date".to_string(),
            "Description".to_string(),
            "Duration (in hrs)".to_string(),
        ],
        rows: vec![
            // 2024-01-06 is a Saturday.
            vec![text("AcmeCo"), text("2024-01-06"), text("call"), CellValue::Number(4.0)],
            vec![text("AcmeCo"), text("2024-01-08"), text("dev work"), CellValue::Number(8.0)],
            vec![text("Sick Leave"), text("2024-01-09"), text(""), CellValue::Empty],
            vec![text("AcmeCo"), text("2024-01-10"), text(""), CellValue::Empty],
        ],
    };
    let feb = SheetTable {
        sheet_name: "Feb".to_string(),
        columns: vec![
            "Client".to_string(),
            "Date".to_string(),
            "Description".to_string(),
            "Hours".to_string(),
        ],
        rows: vec![vec![
            text("AcmeCo"),
            text("2024-02-01"),
            text("dev work"),
            CellValue::Number(8.0),
        ]],
    };
    excel_write::write_workbook(path, &WorkbookData { tables: vec![jan, feb] })
        .expect("input workbook written");
}

fn layout_in(dir: &Path) -> OutputLayout {
    OutputLayout::new(dir.join("outputs"), dir.join("archives"), dir.join("validations"))
        .expect("layout created")
}

#[test]
fn classification_covers_the_attendance_rules() {
    let temp = tempdir().expect("temporary directory");
    let input = temp.path().join("timesheet.xlsx");
    write_input_workbook(&input);

    let run = validate::validate_workbook(&input).expect("workbook validated");
    assert_eq!(run.file_name, "timesheet.xlsx");
    assert_eq!(run.sheets.len(), 2);

    let jan = &run.sheets[0];
    assert_eq!(jan.entries[0].status, "Half-day detected");
    assert_eq!(jan.entries[0].flag_cell(), "Weekend filled; Half-Day Alert");
    assert_eq!(jan.entries[1].status, "Valid");
    assert!(jan.entries[1].flags.is_empty());
    assert_eq!(jan.entries[2].status, "Valid");
    assert_eq!(jan.entries[2].flag_cell(), "Blank Description");
    assert_eq!(jan.entries[3].status, "Missing hours for a working day");
    assert_eq!(jan.total_hours(), 12.0);

    let summary = &run.summary;
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].sheet_name, "Jan");
    assert_eq!(
        summary[0].review,
        "Contains half-days, Missing hours entries, Has blank descriptions, Contains weekend entries"
    );
    assert_eq!(summary[1].review, "OK");
    assert_eq!(summary[2].file_name, "Total");
    assert_eq!(summary[2].total_hours, 20.0);
}

#[test]
fn validation_fails_for_unreadable_input() {
    let temp = tempdir().expect("temporary directory");
    let missing = temp.path().join("absent.xlsx");
    assert!(validate::validate_workbook(&missing).is_err());

    let corrupt = temp.path().join("corrupt.xlsx");
    std::fs::write(&corrupt, b"not a workbook").expect("corrupt file written");
    assert!(validate::validate_workbook(&corrupt).is_err());
}

#[test]
fn versioned_save_writes_workbook_summary_and_ledgers() {
    let temp = tempdir().expect("temporary directory");
    let input = temp.path().join("timesheet.xlsx");
    write_input_workbook(&input);
    let layout = layout_in(temp.path());

    let run = validate::validate_workbook(&input).expect("workbook validated");
    let saved = output::save_validated(&layout, &run, Some(2)).expect("run saved");

    assert!(saved.exists());
    assert_eq!(saved.file_name().unwrap(), "timesheet.xlsx");
    let run_folder = saved.parent().expect("run folder");
    assert!(
        run_folder
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("validation_")
    );
    assert!(run_folder.join("validation_summary.xlsx").exists());

    let numbered_dir = layout.validation_dir.join("validation2");
    assert!(run_folder.starts_with(&numbered_dir));

    // Per-folder ledger.
    let folder_ledger_path = numbered_dir.join("validation2_summary.xlsx");
    assert!(folder_ledger_path.exists());
    let entries = Ledger::new(folder_ledger_path, false).load_or_empty();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].serial, 1);
    assert_eq!(entries[0].sheet_name, "Jan");
    assert_eq!(entries[1].serial, 2);
    assert_eq!(entries[1].review, "OK");

    // Master ledger records the producing folder.
    let master_path = layout.validation_dir.join("master_validation_summary.xlsx");
    assert!(master_path.exists());
    let master_entries = Ledger::new(master_path.clone(), true).load_or_empty();
    assert_eq!(master_entries.len(), 2);
    assert_eq!(
        master_entries[0].validation_folder.as_deref(),
        Some("validation2")
    );

    // A second run continues the serial sequence; folders never collide
    // because each run gets its own timestamped subfolder.
    let second = output::save_validated(&layout, &run, Some(2)).expect("second save");
    assert_ne!(saved.parent(), second.parent());
    let master_entries = Ledger::new(master_path, true).load_or_empty();
    assert_eq!(
        master_entries.iter().map(|e| e.serial).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn base_directory_runs_skip_the_master_ledger() {
    let temp = tempdir().expect("temporary directory");
    let input = temp.path().join("timesheet.xlsx");
    write_input_workbook(&input);
    let layout = layout_in(temp.path());

    let run = validate::validate_workbook(&input).expect("workbook validated");
    output::save_validated(&layout, &run, None).expect("run saved");

    assert!(layout.validation_dir.join("validation_summary.xlsx").exists());
    assert!(
        !layout
            .validation_dir
            .join("master_validation_summary.xlsx")
            .exists()
    );
}

#[test]
fn saved_workbook_round_trips_through_the_reader() {
    let temp = tempdir().expect("temporary directory");
    let input = temp.path().join("timesheet.xlsx");
    write_input_workbook(&input);
    let layout = layout_in(temp.path());

    let run = validate::validate_workbook(&input).expect("workbook validated");
    let saved = output::save_validated(&layout, &run, None).expect("run saved");

    let sheets = excel_read::read_sheets(&saved).expect("validated workbook read");
    assert_eq!(sheets.len(), 2);
    let jan = &sheets[0];
    assert_eq!(
        jan.headers,
        vec!["Client", "Date", "Sheet Name", "Hours", "Status", "Flag"]
    );
    assert_eq!(jan.rows[0][0], RawCell::Text("AcmeCo".into()));
    assert_eq!(jan.rows[0][1], RawCell::Text("2024-01-06".into()));
    assert_eq!(jan.rows[0][3], RawCell::Number(4.0));
    assert_eq!(jan.rows[0][4], RawCell::Text("Half-day detected".into()));
    assert_eq!(
        jan.rows[0][5],
        RawCell::Text("Weekend filled; Half-Day Alert".into())
    );
}

#[test]
fn zip_bundle_contains_exactly_the_two_expected_entries() {
    let temp = tempdir().expect("temporary directory");
    let input = temp.path().join("timesheet.xlsx");
    write_input_workbook(&input);
    let layout = layout_in(temp.path());

    let run = validate::validate_workbook(&input).expect("workbook validated");
    let saved = output::save_validated(&layout, &run, None).expect("run saved");

    let zip_path = output::zip_validated(&layout, &saved).expect("zip created");
    assert!(zip_path.starts_with(&layout.output_dir));

    let archive =
        zip::ZipArchive::new(File::open(&zip_path).expect("zip opened")).expect("zip parsed");
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Validation_Summary.xlsx", "timesheet_validated.xlsx"]);
}

#[test]
fn zip_bundle_degrades_without_a_summary() {
    let temp = tempdir().expect("temporary directory");
    let layout = layout_in(temp.path());

    let lone = temp.path().join("lone.xlsx");
    write_input_workbook(&lone);

    let zip_path = output::zip_validated(&layout, &lone).expect("zip created");
    let archive =
        zip::ZipArchive::new(File::open(&zip_path).expect("zip opened")).expect("zip parsed");
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names, vec!["lone_validated.xlsx"]);
}

#[test]
fn monthly_template_round_trips_with_calendar_defaults() {
    let temp = tempdir().expect("temporary directory");
    let layout = layout_in(temp.path());

    let path = template::generate(&layout, Some(2), Some(2024)).expect("template generated");
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "Timesheet_February_2024.xlsx"
    );

    let sheets = excel_read::read_sheets(&path).expect("template read");
    assert_eq!(sheets.len(), 1);
    let sheet = &sheets[0];
    assert_eq!(sheet.name, "February 2024");
    assert_eq!(
        sheet.headers,
        vec!["Date", "Day", "Client", "Sheet Name", "Hours"]
    );
    assert_eq!(sheet.rows.len(), 29);

    // 2024-02-03 is a Saturday, 2024-02-05 a Monday.
    assert_eq!(sheet.rows[2][2], RawCell::Text("Weekend".into()));
    assert_eq!(sheet.rows[2][4], RawCell::Number(0.0));
    assert_eq!(sheet.rows[4][2], RawCell::Empty);
    assert_eq!(sheet.rows[4][4], RawCell::Number(8.0));
}
