//! Error types attached to roll results.
//!
//! Nothing here is fatal: every variant describes a degradation ("the
//! literal text was left in place", "the reroll was a no-op") that the
//! caller surfaces alongside the result it still received.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A non-fatal problem recorded while resolving or rerolling.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RollError {
    /// A `[name]` matched neither a local section nor any known table.
    /// The literal bracket text was left in the output.
    #[error("could not resolve reference: [{0}]")]
    UnresolvedReference(String),

    /// Recursion reached the depth limit; remaining references in that
    /// branch were left unexpanded.
    #[error("depth limit reached while expanding \"{0}\"")]
    DepthLimit(String),

    /// The table has no `output` section; the roll fell back to the
    /// first section with entries.
    #[error("no output section in table \"{0}\"")]
    MissingOutput(String),

    /// A reroll/force named a subroll index outside the result.
    #[error("subroll index {0} is out of range")]
    InvalidRerollTarget(usize),

    /// The targeted subroll is a terminal roll, which cannot be
    /// re-resolved through a section or table.
    #[error("subroll {0} is not a subtable and cannot be rerolled")]
    NotRerollable(usize),

    /// A force named a section that produced no subroll in the result.
    #[error("no subroll from section \"{0}\" to force")]
    UnknownSection(String),

    /// A force named an entry index outside the section.
    #[error("section \"{section}\" has no entry {index}")]
    InvalidEntryIndex {
        /// The section the force targeted.
        section: String,
        /// The out-of-range entry index.
        index: usize,
    },

    /// A span partially overlapped the spliced range. This indicates a
    /// bookkeeping bug; the span was dropped rather than corrupted.
    #[error("subroll from \"{0}\" partially overlapped a splice and was dropped")]
    SpliceDefect(String),
}
