//! Export pipeline: load, render, serialize, write.
//!
//! # Responsibility
//! - `docx`: turn a document model into `.docx` bytes.
//! - `driver`: iterate notes and write one file per note.
//!
//! # Invariants
//! - One note's failure never aborts the remaining notes.
//! - Rendering happens entirely in memory; only the driver touches the
//!   filesystem.

use crate::repo::note_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod docx;
pub mod driver;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document library rejected the model.
    Serialize(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Serialize(message) => write!(f, "failed to serialize document: {message}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Serialize(_) => None,
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
