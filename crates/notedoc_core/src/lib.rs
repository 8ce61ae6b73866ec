//! Core logic for NoteDoc.
//! Loads therapy session notes from SQLite and renders each one into a
//! formatted, human-readable document.

pub mod db;
pub mod export;
pub mod format;
pub mod logging;
pub mod model;
pub mod palette;
pub mod render;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::docx::{DocumentSerializer, DocxSerializer};
pub use export::driver::{
    ExportDriver, ExportOptions, ExportSummary, ExportedNote, FailedNote, DEFAULT_OUTPUT_DIR,
};
pub use export::{ExportError, ExportResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::aggregate::{
    AssessmentOption, Client, LinkedOption, NoteAggregate, NoteId, OptionChoice, OptionId,
    SessionNote, Symptom,
};
pub use model::document::DocumentModel;
pub use palette::{Palette, Rgb};
pub use render::note::{section_plan, NoteRenderer, Section};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
