//! Record-to-document rendering.
//!
//! # Responsibility
//! - `builder`: palette-styled block primitives over the document model.
//! - `note`: section order and inclusion rules for one session note.
//!
//! # Invariants
//! - Rendering is deterministic and touches no shared state.

pub mod builder;
pub mod note;
