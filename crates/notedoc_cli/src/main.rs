//! `notedoc` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, initialize logging and run one export.
//! - Report per-note results and exit non-zero when any note failed.

use clap::Parser;
use log::error;
use notedoc_core::{
    default_log_level, init_logging, open_db, DocxSerializer, ExportDriver, ExportOptions,
    ExportSummary, NoteRenderer, SqliteNoteRepository, DEFAULT_OUTPUT_DIR,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "notedoc", version)]
#[command(about = "Export therapy session notes as Word documents", long_about = None)]
struct Cli {
    /// Path to the notes SQLite database
    database: PathBuf,

    /// Directory that receives the generated documents
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Export only this note id (repeatable)
    #[arg(short, long = "note", value_name = "ID")]
    notes: Vec<i64>,

    /// Show what would be written without creating files
    #[arg(long)]
    dry_run: bool,

    /// trace|debug|info|warn|error
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Write rotating log files here instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = init_logging(&cli.log_level, cli.log_dir.as_deref()) {
        eprintln!("notedoc: {message}");
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(summary) => {
            print_summary(&summary, cli.dry_run);
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(message) => {
            error!("event=cli_run module=cli status=error");
            eprintln!("notedoc: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExportSummary, String> {
    let conn = open_db(&cli.database).map_err(|err| err.to_string())?;
    let repo = SqliteNoteRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let driver = ExportDriver::new(repo, NoteRenderer::default(), DocxSerializer);

    let options = ExportOptions {
        output_dir: cli.output_dir.clone(),
        note_ids: cli.notes.clone(),
        dry_run: cli.dry_run,
    };
    driver.run(&options).map_err(|err| err.to_string())
}

fn print_summary(summary: &ExportSummary, dry_run: bool) {
    let verb = if dry_run { "would write" } else { "wrote" };
    for exported in &summary.exported {
        println!("note {}: {} {}", exported.note_id, verb, exported.path.display());
    }
    for failed in &summary.failed {
        println!("note {}: failed: {}", failed.note_id, failed.reason);
    }
    println!(
        "{} exported, {} failed",
        summary.exported.len(),
        summary.failed.len()
    );
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use notedoc_core::DEFAULT_OUTPUT_DIR;
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_defaults_and_repeated_notes() {
        let cli = Cli::try_parse_from(["notedoc", "notes.db"]).unwrap();
        assert_eq!(cli.database, PathBuf::from("notes.db"));
        assert_eq!(cli.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(cli.notes.is_empty());
        assert!(!cli.dry_run);

        let cli = Cli::try_parse_from([
            "notedoc", "notes.db", "out", "--note", "3", "-n", "7", "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.notes, vec![3, 7]);
        assert!(cli.dry_run);
    }
}
