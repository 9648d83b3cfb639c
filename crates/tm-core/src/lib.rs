//! Core types for Tablemancer: tables, sections, and roll results.
//!
//! This crate defines the data model that the definition parser produces
//! and the roll engine consumes. It is independent of both — you can
//! construct a [`Table`] programmatically or deserialize one from JSON.

/// Error types attached to roll results.
pub mod error;
/// Scanner for `[name]` references and `{dice}` expressions in entry text.
pub mod markers;
/// Roll results, subroll spans, and forced selections.
pub mod roll;
/// Tables, sections, and table identifiers.
pub mod table;

/// Re-export roll error types.
pub use error::RollError;
/// Re-export marker scanning.
pub use markers::{Marker, scan_markers};
/// Re-export roll result types.
pub use roll::{ForcedSelection, RollResult, Subroll, SubrollKind};
/// Re-export table types.
pub use table::{OUTPUT_SECTION, Section, Table, TableId};
