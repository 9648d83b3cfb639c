//! Recursive resolution of entry text into rolled results.
//!
//! One function does all the expanding: [`Roller::resolve`] walks an
//! entry's markers and recurses, parameterized by the table whose
//! sections are in scope. Expanding a cross-table reference swaps the
//! scope to the referenced table — there is no second code path for
//! "full table rolls", only a synthetic wrapper span on top.

use std::cmp::Ordering;

use rand::Rng;
use rand::rngs::StdRng;

use tm_core::markers::{Marker, scan_markers};
use tm_core::roll::forced_index;
use tm_core::{
    ForcedSelection, OUTPUT_SECTION, RollError, RollResult, Section, Subroll, SubrollKind, Table,
};

use crate::dice::DiceExpr;
use crate::library::TableLibrary;
use crate::spans::shift;

/// Default bound on reference expansion depth. This is the primary
/// defense against undetected reference cycles: a branch that reaches
/// it stops expanding and leaves its remaining `[name]` tokens as
/// literal text.
pub const MAX_DEPTH: usize = 10;

/// The resolution engine: expands entries against a table scope and a
/// library of known tables.
///
/// A roller is cheap to construct and holds no mutable state; every
/// call takes the RNG by mutable reference and returns a fresh
/// [`RollResult`].
#[derive(Debug, Clone, Copy)]
pub struct Roller<'a> {
    pub(crate) library: &'a TableLibrary,
    pub(crate) max_depth: usize,
}

impl<'a> Roller<'a> {
    /// Create a roller over `library` with the default depth limit.
    pub fn new(library: &'a TableLibrary) -> Self {
        Self {
            library,
            max_depth: MAX_DEPTH,
        }
    }

    /// Override the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Roll on a table: resolve a random entry of its `output` section
    /// and wrap the whole result in a synthetic container span.
    pub fn roll(&self, table: &Table, rng: &mut StdRng) -> RollResult {
        self.roll_table_at(table, &[], 0, rng)
    }

    /// Roll on a table with forced selections pinning specific entries.
    pub fn roll_forced(
        &self,
        table: &Table,
        forced: &[ForcedSelection],
        rng: &mut StdRng,
    ) -> RollResult {
        self.roll_table_at(table, forced, 0, rng)
    }

    /// Resolve one entry's text against `table`'s sections, without the
    /// output wrapper a full table roll adds.
    pub fn resolve(
        &self,
        entry: &str,
        table: &Table,
        forced: &[ForcedSelection],
        rng: &mut StdRng,
    ) -> RollResult {
        self.resolve_text(entry, table, forced, 0, rng)
    }

    pub(crate) fn roll_table_at(
        &self,
        table: &Table,
        forced: &[ForcedSelection],
        depth: usize,
        rng: &mut StdRng,
    ) -> RollResult {
        let Some(section) = table.entry_point() else {
            return RollResult {
                text: String::new(),
                subrolls: Vec::new(),
                errors: vec![RollError::MissingOutput(table.title.clone())],
            };
        };

        let mut errors = Vec::new();
        if !section.name.eq_ignore_ascii_case(OUTPUT_SECTION) {
            errors.push(RollError::MissingOutput(table.title.clone()));
        }

        let entry_index = choose(section, forced_index(forced, &section.name), rng);
        let entry = section.entries[entry_index].clone();

        let mut result = self.resolve_text(&entry, table, forced, depth + 1, rng);
        errors.append(&mut result.errors);
        result.errors = errors;

        result.subrolls.push(Subroll {
            range: 0..result.text.len(),
            source: section.name.clone(),
            kind: SubrollKind::SubtableContainer,
            original_entry: entry,
            entry_index,
            depth,
        });
        result.subrolls.sort_by(span_order);
        result
    }

    pub(crate) fn resolve_text(
        &self,
        text: &str,
        scope: &Table,
        forced: &[ForcedSelection],
        depth: usize,
        rng: &mut StdRng,
    ) -> RollResult {
        let mut out = text.to_string();
        let mut subrolls: Vec<Subroll> = Vec::new();
        let mut errors: Vec<RollError> = Vec::new();

        // Rightmost match first: offsets of matches still to be
        // processed stay valid while later text is substituted, so the
        // in-progress string needs no second correction pass.
        for marker in scan_markers(text).iter().rev() {
            let range = marker.range().clone();
            match marker {
                Marker::Dice { expr, .. } => {
                    let Some(parsed) = DiceExpr::parse(expr) else {
                        // Plain prose in braces; not ours.
                        continue;
                    };
                    let rendered = parsed.render(parsed.roll(rng));
                    let delta = rendered.len() as isize - range.len() as isize;
                    let original = out[range.clone()].to_string();
                    out.replace_range(range.clone(), &rendered);
                    shift_recorded(&mut subrolls, range.end, delta);
                    subrolls.push(Subroll {
                        range: range.start..range.start + rendered.len(),
                        source: expr.clone(),
                        kind: SubrollKind::Terminal,
                        original_entry: original,
                        entry_index: 0,
                        depth,
                    });
                }
                Marker::Reference { name, .. } => {
                    if depth >= self.max_depth {
                        errors.push(RollError::DepthLimit(name.clone()));
                        continue;
                    }

                    // Local sections shadow other tables' titles.
                    let expanded = if let Some(section) =
                        scope.section(name).filter(|s| !s.entries.is_empty())
                    {
                        let entry_index = choose(section, forced_index(forced, name), rng);
                        let entry = section.entries[entry_index].clone();
                        let nested = self.resolve_text(&entry, scope, forced, depth + 1, rng);
                        Some((nested, section.name.clone(), entry, entry_index))
                    } else if let Some(table) = self.library.get(name) {
                        let nested = self.roll_table_at(table, &[], depth + 1, rng);
                        let (entry, entry_index) = wrapper_choice(&nested);
                        Some((nested, name.clone(), entry, entry_index))
                    } else {
                        None
                    };

                    let Some((nested, source, entry, entry_index)) = expanded else {
                        errors.push(RollError::UnresolvedReference(name.clone()));
                        continue;
                    };

                    let delta = nested.text.len() as isize - range.len() as isize;
                    out.replace_range(range.clone(), &nested.text);
                    shift_recorded(&mut subrolls, range.end, delta);
                    errors.extend(nested.errors);

                    let kind = if nested.subrolls.is_empty() {
                        SubrollKind::SubtableLeaf
                    } else {
                        SubrollKind::SubtableContainer
                    };
                    for mut span in nested.subrolls {
                        span.range = shift(&span.range, range.start as isize);
                        subrolls.push(span);
                    }
                    subrolls.push(Subroll {
                        range: range.start..range.start + nested.text.len(),
                        source,
                        kind,
                        original_entry: entry,
                        entry_index,
                        depth,
                    });
                }
            }
        }

        subrolls.sort_by(span_order);
        RollResult {
            text: out,
            subrolls,
            errors,
        }
    }
}

/// Ordering for span lists: by start, containers before their contents
/// (longer ranges first), shallower before deeper.
pub(crate) fn span_order(a: &Subroll, b: &Subroll) -> Ordering {
    a.range
        .start
        .cmp(&b.range.start)
        .then_with(|| b.range.end.cmp(&a.range.end))
        .then_with(|| a.depth.cmp(&b.depth))
}

/// Pick an entry index: a valid forced index wins, otherwise uniform.
pub(crate) fn choose(section: &Section, forced: Option<usize>, rng: &mut StdRng) -> usize {
    forced
        .filter(|&i| i < section.entries.len())
        .unwrap_or_else(|| rng.random_range(0..section.entries.len()))
}

/// Shift spans recorded at or beyond `cut_end` by `delta`.
fn shift_recorded(subrolls: &mut [Subroll], cut_end: usize, delta: isize) {
    for span in subrolls {
        if span.range.start >= cut_end {
            span.range = shift(&span.range, delta);
        }
    }
}

/// The entry choice recorded on a nested roll's wrapper span.
pub(crate) fn wrapper_choice(result: &RollResult) -> (String, usize) {
    result.root().map_or_else(
        || (String::new(), 0),
        |i| {
            let span = &result.subrolls[i];
            (span.original_entry.clone(), span.entry_index)
        },
    )
}
