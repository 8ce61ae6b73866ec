//! SQLite access to the therapy notes database.
//!
//! # Responsibility
//! - Open the notes database for export (read-only).
//! - Provide the bundled schema for in-memory fixtures.
//!
//! # Invariants
//! - Export never writes to a file-backed database.
//! - Opening a path that does not exist is an error, not a new database.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;

pub use open::{install_schema, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    DatabaseNotFound(PathBuf),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::DatabaseNotFound(path) => {
                write!(f, "database file not found: {}", path.display())
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::DatabaseNotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
