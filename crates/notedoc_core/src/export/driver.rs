//! Export driver: one document file per note.
//!
//! # Responsibility
//! - Select notes, load aggregates, render, serialize and write files.
//! - Derive output file names from note id, client code and appointment date.
//! - Report per-note outcomes in an [`ExportSummary`].
//!
//! # Invariants
//! - The option lookup table is read once per run.
//! - A failing note is recorded and skipped; only setup failures abort.
//! - Dry runs never touch the filesystem.

use super::docx::DocumentSerializer;
use super::{ExportError, ExportResult};
use crate::format::file_date;
use crate::model::aggregate::{AssessmentOption, NoteAggregate, NoteId};
use crate::render::note::NoteRenderer;
use crate::repo::note_repo::NoteRepository;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9.\-]").expect("valid file name regex"));

/// Directory used when the caller does not choose one.
pub const DEFAULT_OUTPUT_DIR: &str = "./exported_notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Notes to export, in order. Empty exports every note.
    pub note_ids: Vec<NoteId>,
    /// Compute file names without writing anything.
    pub dry_run: bool,
}

impl ExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            note_ids: Vec::new(),
            dry_run: false,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNote {
    pub note_id: NoteId,
    pub path: PathBuf,
    /// Serialized size; zero for dry runs.
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedNote {
    pub note_id: NoteId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: Vec<ExportedNote>,
    pub failed: Vec<FailedNote>,
}

impl ExportSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.exported.len() + self.failed.len()
    }
}

/// Runs exports over a repository with a fixed renderer and serializer.
pub struct ExportDriver<R: NoteRepository, S: DocumentSerializer> {
    repo: R,
    renderer: NoteRenderer,
    serializer: S,
}

impl<R: NoteRepository, S: DocumentSerializer> ExportDriver<R, S> {
    pub fn new(repo: R, renderer: NoteRenderer, serializer: S) -> Self {
        Self {
            repo,
            renderer,
            serializer,
        }
    }

    /// Exports the selected notes into `options.output_dir`.
    ///
    /// # Errors
    /// - Returns an error when the output directory cannot be created or
    ///   the note list / option table cannot be read.
    /// - Per-note failures are reported in the summary instead.
    pub fn run(&self, options: &ExportOptions) -> ExportResult<ExportSummary> {
        let started_at = Instant::now();
        let note_ids = if options.note_ids.is_empty() {
            self.repo.list_note_ids()?
        } else {
            options.note_ids.clone()
        };
        info!(
            "event=export_start module=export status=start notes={} dry_run={}",
            note_ids.len(),
            options.dry_run
        );

        if !options.dry_run {
            fs::create_dir_all(&options.output_dir).map_err(|source| ExportError::Io {
                path: options.output_dir.clone(),
                source,
            })?;
        }

        let assessment_options = self.repo.list_assessment_options()?;
        let mut summary = ExportSummary::default();
        for note_id in note_ids {
            match self.export_note(note_id, &assessment_options, options) {
                Ok(exported) => {
                    info!(
                        "event=note_export module=export status=ok note_id={} bytes={}",
                        note_id, exported.bytes
                    );
                    summary.exported.push(exported);
                }
                Err(err) => {
                    error!(
                        "event=note_export module=export status=error note_id={} error={}",
                        note_id, err
                    );
                    summary.failed.push(FailedNote {
                        note_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            "event=export_done module=export status={} exported={} failed={} duration_ms={}",
            if summary.is_success() { "ok" } else { "error" },
            summary.exported.len(),
            summary.failed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(summary)
    }

    fn export_note(
        &self,
        note_id: NoteId,
        assessment_options: &[AssessmentOption],
        options: &ExportOptions,
    ) -> ExportResult<ExportedNote> {
        let aggregate = self.repo.load_aggregate(note_id, assessment_options)?;
        let path = options
            .output_dir
            .join(note_file_name(&aggregate, self.serializer.extension()));

        if options.dry_run {
            return Ok(ExportedNote {
                note_id,
                path,
                bytes: 0,
            });
        }

        let model = self.renderer.render(&aggregate);
        let bytes = self.serializer.serialize(&model)?;
        fs::write(&path, &bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(ExportedNote {
            note_id,
            path,
            bytes: bytes.len(),
        })
    }
}

/// `note_<id>_<client code>_<YYYY-MM-DD>.<extension>`.
///
/// Falls back to `unknown` without a client code and `no-date` without a
/// parseable appointment timestamp.
pub fn note_file_name(aggregate: &NoteAggregate, extension: &str) -> String {
    let client_code = aggregate
        .client
        .as_ref()
        .and_then(|client| client.client_code.as_deref())
        .map(sanitize_file_component)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let date = file_date(aggregate.note.appt_date_time.as_deref())
        .unwrap_or_else(|| "no-date".to_string());

    format!(
        "note_{}_{}_{}.{}",
        aggregate.note.id, client_code, date, extension
    )
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_component(value: &str) -> String {
    UNSAFE_FILE_CHARS_RE.replace_all(value, "_").into_owned()
}
