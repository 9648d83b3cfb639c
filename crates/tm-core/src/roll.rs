//! Roll results, subroll spans, and forced selections.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::RollError;
use crate::table::OUTPUT_SECTION;

/// What kind of resolution produced a subroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubrollKind {
    /// A terminal roll (inline dice); re-resolving it through a section
    /// or table is meaningless.
    Terminal,
    /// A subtable expansion with no nested subrolls of its own.
    SubtableLeaf,
    /// A subtable expansion containing further nested subrolls. The
    /// synthetic wrapper a full table roll adds over its entire result
    /// is also a container, with source [`OUTPUT_SECTION`].
    SubtableContainer,
}

impl SubrollKind {
    /// Whether this subroll came from a section or table expansion and
    /// can therefore be rerolled.
    pub fn is_subtable(self) -> bool {
        matches!(self, Self::SubtableLeaf | Self::SubtableContainer)
    }
}

impl std::fmt::Display for SubrollKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal => write!(f, "terminal"),
            Self::SubtableLeaf => write!(f, "subtable"),
            Self::SubtableContainer => write!(f, "subtable+"),
        }
    }
}

/// One recorded resolution inside a roll result: which byte range of
/// the final text came from which reference, and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subroll {
    /// Half-open byte range `[start, end)` into the result text.
    pub range: Range<usize>,
    /// The section or table name that produced this span (or the dice
    /// expression, for terminals).
    pub source: String,
    /// Classification of the resolution.
    pub kind: SubrollKind,
    /// The raw entry text that was selected, before resolution.
    pub original_entry: String,
    /// Index of the selected entry in the source section.
    pub entry_index: usize,
    /// Nesting depth; 0 is the outermost expansion.
    pub depth: usize,
}

impl Subroll {
    /// Length of the covered range in bytes.
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Whether the covered range is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A section name paired with an entry index, pinning a specific choice
/// instead of a random draw for one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedSelection {
    /// Section the pin applies to (case-insensitive).
    pub section: String,
    /// Entry index to select whenever that section is rolled.
    pub entry_index: usize,
}

impl ForcedSelection {
    /// Pin `section` to its `entry_index`-th entry.
    pub fn new(section: impl Into<String>, entry_index: usize) -> Self {
        Self {
            section: section.into(),
            entry_index,
        }
    }
}

/// Find the pinned entry index for `section`, if any.
pub fn forced_index(forced: &[ForcedSelection], section: &str) -> Option<usize> {
    let folded = section.to_lowercase();
    forced
        .iter()
        .find(|f| f.section.to_lowercase() == folded)
        .map(|f| f.entry_index)
}

/// The outcome of one resolution: final text plus the spans recording
/// where each piece came from.
///
/// Results are never mutated after construction; reroll and force
/// produce new values, leaving the old result valid for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Final flattened text after all substitutions.
    pub text: String,
    /// Subrolls sorted by (start, end descending, depth).
    pub subrolls: Vec<Subroll>,
    /// Non-fatal problems encountered while resolving.
    pub errors: Vec<RollError>,
}

impl RollResult {
    /// The slice of the result text covered by subroll `index`.
    pub fn span_text(&self, index: usize) -> Option<&str> {
        self.subrolls.get(index).map(|s| &self.text[s.range.clone()])
    }

    /// Index of the first subroll covering the entire text, if any
    /// (a full table roll's output wrapper).
    pub fn root(&self) -> Option<usize> {
        self.subrolls
            .iter()
            .position(|s| s.range.start == 0 && s.range.end == self.text.len())
    }

    /// Indices of the subrolls a user can pick as reroll targets.
    ///
    /// Excludes terminals, output wrappers, the root span covering the
    /// whole text, and spans with out-of-bounds ranges. When several
    /// spans cover the identical range (a chain like `[food]` →
    /// `[fruit]` → "strawberry"), only the deepest is kept.
    pub fn rerollable(&self) -> Vec<usize> {
        let root = self.root();
        let candidates: Vec<usize> = self
            .subrolls
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                s.kind.is_subtable()
                    && !s.source.eq_ignore_ascii_case(OUTPUT_SECTION)
                    && Some(*i) != root
                    && s.range.end <= self.text.len()
                    && s.range.start < s.range.end
            })
            .map(|(i, _)| i)
            .collect();

        candidates
            .iter()
            .copied()
            .filter(|&i| {
                let span = &self.subrolls[i];
                !candidates.iter().any(|&j| {
                    j != i
                        && self.subrolls[j].range == span.range
                        && self.subrolls[j].depth > span.depth
                })
            })
            .collect()
    }

    /// Indices of rerollable subrolls not contained in any other
    /// rerollable subroll.
    pub fn top_level(&self) -> Vec<usize> {
        let rerollable = self.rerollable();
        rerollable
            .iter()
            .copied()
            .filter(|&i| {
                let span = &self.subrolls[i].range;
                !rerollable.iter().any(|&j| {
                    j != i
                        && self.subrolls[j].range.start <= span.start
                        && self.subrolls[j].range.end >= span.end
                        && self.subrolls[j].range != *span
                })
            })
            .collect()
    }

    /// Pairs of subrolls that are neither fully nested nor disjoint.
    ///
    /// An empty list is an invariant of every engine-produced result;
    /// the check exists for tests and defensive callers.
    pub fn nesting_defects(&self) -> Vec<(usize, usize)> {
        let mut defects = Vec::new();
        for i in 0..self.subrolls.len() {
            for j in i + 1..self.subrolls.len() {
                let a = &self.subrolls[i].range;
                let b = &self.subrolls[j].range;
                let disjoint = a.end <= b.start || b.end <= a.start;
                let nested = (a.start <= b.start && b.end <= a.end)
                    || (b.start <= a.start && a.end <= b.end);
                if !disjoint && !nested {
                    defects.push((i, j));
                }
            }
        }
        defects
    }
}
