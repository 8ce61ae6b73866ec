//! Repository layer over the notes database.
//!
//! # Responsibility
//! - Define the read contract the export driver depends on.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories only read; export never mutates stored notes.
//! - Semantic errors (`NoteNotFound`, missing schema) are distinct from
//!   SQLite transport errors.

pub mod note_repo;
