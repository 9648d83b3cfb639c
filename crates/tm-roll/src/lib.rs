//! Resolution and reroll engine for Tablemancer tables.
//!
//! Rolling is a pure transformation: every call takes read-only tables,
//! a [`TableLibrary`] for cross-table references, and a `&mut StdRng`,
//! and returns a fresh [`tm_core::RollResult`]. Nothing is shared or
//! mutated, so independent sessions can roll in parallel.

pub mod dice;
pub mod library;
pub mod reroll;
pub mod resolve;
pub mod spans;

pub use dice::DiceExpr;
pub use library::TableLibrary;
pub use resolve::{MAX_DEPTH, Roller};
pub use spans::{Placement, Splice, classify, shift, splice_spans};
