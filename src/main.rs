use std::path::PathBuf;

use clap::{Parser, Subcommand};
use timesheet_tools::output::{self, OutputLayout, template};
use timesheet_tools::validate;
use timesheet_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Validate(args) => execute_validate(args),
        Command::Template(args) => execute_template(args),
        Command::Archive(args) => execute_archive(args),
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_validate(args: ValidateArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let layout = args.dirs.layout()?;
    let run = validate::validate_workbook(&args.input)?;
    let saved_path = output::save_validated(&layout, &run, args.validation_number)?;
    println!("validated workbook saved to {}", saved_path.display());

    if let Some(report_path) = &args.report {
        let report = serde_json::to_string_pretty(&run.summary)?;
        std::fs::write(report_path, report)?;
        println!("summary report written to {}", report_path.display());
    }

    if args.zip {
        let zip_path = output::zip_validated(&layout, &saved_path)?;
        println!("zip bundle created at {}", zip_path.display());
    }

    Ok(())
}

fn execute_template(args: TemplateArgs) -> Result<()> {
    let layout = args.dirs.layout()?;
    let path = template::generate(&layout, args.month, args.year)?;
    println!("monthly template created at {}", path.display());
    Ok(())
}

fn execute_archive(args: ArchiveArgs) -> Result<()> {
    let layout = args.dirs.layout()?;
    let (original, archived) = output::archive_snapshot(&layout, &args.file)?;
    println!("archived {} as {}", original.display(), archived.display());
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Validate timesheet workbooks and manage versioned, auditable outputs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a timesheet workbook and persist a versioned run.
    Validate(ValidateArgs),
    /// Generate a pre-filled template for a calendar month.
    Template(TemplateArgs),
    /// Snapshot a file into the archive directory.
    Archive(ArchiveArgs),
}

#[derive(clap::Args)]
struct DirArgs {
    /// Directory receiving templates and zip bundles.
    #[arg(long, default_value = "media/timesheet_outputs")]
    output_dir: PathBuf,

    /// Directory receiving archive snapshots.
    #[arg(long, default_value = "media/timesheet_archives")]
    archive_dir: PathBuf,

    /// Base directory for versioned validation runs and ledgers.
    #[arg(long, default_value = "media/timesheet_validations")]
    validation_dir: PathBuf,
}

impl DirArgs {
    fn layout(&self) -> Result<OutputLayout> {
        OutputLayout::new(
            self.output_dir.clone(),
            self.archive_dir.clone(),
            self.validation_dir.clone(),
        )
    }
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Input workbook path.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    dirs: DirArgs,

    /// Named validation folder to use instead of the base directory.
    #[arg(long)]
    validation_number: Option<u32>,

    /// Bundle the validated workbook and its summary into a zip archive.
    #[arg(long)]
    zip: bool,

    /// Optional path for a JSON summary report.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TemplateArgs {
    #[command(flatten)]
    dirs: DirArgs,

    /// Calendar month (1-12); defaults to the next month.
    #[arg(long)]
    month: Option<u32>,

    /// Calendar year; defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

#[derive(clap::Args)]
struct ArchiveArgs {
    /// File to snapshot.
    #[arg(long)]
    file: PathBuf,

    #[command(flatten)]
    dirs: DirArgs,
}
