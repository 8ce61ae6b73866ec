//! Data shapes shared by the loader, renderer and serializer.
//!
//! # Responsibility
//! - `aggregate`: read-only input describing one session note.
//! - `document`: library-independent output blocks.
//!
//! # Invariants
//! - Aggregates are never mutated by rendering.
//! - Document models hold no cross-references between blocks.

pub mod aggregate;
pub mod document;
