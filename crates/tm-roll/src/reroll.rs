//! Reroll and force: re-resolving one subroll of a previous result.
//!
//! Both operations splice new text over the target span's old range
//! and repair every other span's offsets through
//! [`splice_spans`](crate::spans::splice_spans). They never fail hard:
//! an invalid target returns the previous result unchanged, with a
//! warning appended to its error list.

use rand::rngs::StdRng;

use tm_core::roll::forced_index;
use tm_core::{ForcedSelection, OUTPUT_SECTION, RollError, RollResult, Subroll, SubrollKind, Table};

use crate::resolve::{Roller, choose, span_order, wrapper_choice};
use crate::spans::{shift, splice_spans};

/// A re-resolution of one span's source, ready to splice.
struct Rerolled {
    result: RollResult,
    original_entry: String,
    entry_index: usize,
}

impl Roller<'_> {
    /// Re-resolve the subroll at `target` with a fresh random choice
    /// and splice the new text into `prev`.
    ///
    /// Only subtable spans can be rerolled; terminals and bad indices
    /// are no-ops that report a warning on the returned result.
    pub fn reroll(
        &self,
        prev: &RollResult,
        target: usize,
        table: &Table,
        rng: &mut StdRng,
    ) -> RollResult {
        let Some(span) = prev.subrolls.get(target) else {
            return no_op(prev, RollError::InvalidRerollTarget(target));
        };
        if !span.kind.is_subtable() {
            return no_op(prev, RollError::NotRerollable(target));
        }

        match self.resolve_source(&span.source, table, &[], span.depth, rng) {
            Some(rerolled) => self.splice_result(prev, target, rerolled),
            None => no_op(prev, RollError::UnresolvedReference(span.source.clone())),
        }
    }

    /// Re-resolve with a pinned entry instead of a random draw.
    ///
    /// Forcing the `output` section performs a full fresh table roll
    /// with that single selection pinned — changing the output entry
    /// can change which nested references exist at all. Forcing any
    /// other section splices over the first span that section produced,
    /// leaving every other choice in the document untouched.
    pub fn force(
        &self,
        prev: &RollResult,
        section_name: &str,
        entry_index: usize,
        table: &Table,
        rng: &mut StdRng,
    ) -> RollResult {
        if section_name.eq_ignore_ascii_case(OUTPUT_SECTION) {
            let Some(output) = table.output() else {
                return no_op(prev, RollError::UnknownSection(section_name.to_string()));
            };
            if entry_index >= output.entries.len() {
                return no_op(
                    prev,
                    RollError::InvalidEntryIndex {
                        section: output.name.clone(),
                        index: entry_index,
                    },
                );
            }
            let forced = [ForcedSelection::new(output.name.clone(), entry_index)];
            return self.roll_forced(table, &forced, rng);
        }

        let Some(section) = table.section(section_name) else {
            return no_op(prev, RollError::UnknownSection(section_name.to_string()));
        };
        if entry_index >= section.entries.len() {
            return no_op(
                prev,
                RollError::InvalidEntryIndex {
                    section: section.name.clone(),
                    index: entry_index,
                },
            );
        }

        let folded = section.name.to_lowercase();
        let Some(target) = prev
            .subrolls
            .iter()
            .position(|s| s.kind.is_subtable() && s.source.to_lowercase() == folded)
        else {
            return no_op(prev, RollError::UnknownSection(section_name.to_string()));
        };

        let forced = [ForcedSelection::new(section.name.clone(), entry_index)];
        let span = &prev.subrolls[target];
        match self.resolve_source(&span.source, table, &forced, span.depth, rng) {
            Some(rerolled) => self.splice_result(prev, target, rerolled),
            None => no_op(prev, RollError::UnresolvedReference(span.source.clone())),
        }
    }

    /// Re-resolve a span's source the same way the original resolution
    /// did: local section first, then table lookup.
    fn resolve_source(
        &self,
        source: &str,
        table: &Table,
        forced: &[ForcedSelection],
        depth: usize,
        rng: &mut StdRng,
    ) -> Option<Rerolled> {
        if let Some(section) = table.section(source).filter(|s| !s.entries.is_empty()) {
            let entry_index = choose(section, forced_index(forced, source), rng);
            let entry = section.entries[entry_index].clone();
            let result = self.resolve_text(&entry, table, forced, depth + 1, rng);
            Some(Rerolled {
                result,
                original_entry: entry,
                entry_index,
            })
        } else if let Some(other) = self.library.get(source) {
            let result = self.roll_table_at(other, &[], depth + 1, rng);
            let (original_entry, entry_index) = wrapper_choice(&result);
            Some(Rerolled {
                result,
                original_entry,
                entry_index,
            })
        } else {
            None
        }
    }

    /// Splice a re-resolution over the target span and repair every
    /// other span's offsets.
    fn splice_result(&self, prev: &RollResult, target: usize, rerolled: Rerolled) -> RollResult {
        let Rerolled {
            result: new,
            original_entry,
            entry_index,
        } = rerolled;
        let old = &prev.subrolls[target];
        let delta = new.text.len() as isize - old.len() as isize;

        let mut text = prev.text.clone();
        text.replace_range(old.range.clone(), &new.text);

        let others: Vec<Subroll> = prev
            .subrolls
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != target)
            .map(|(_, s)| s.clone())
            .collect();
        let splice = splice_spans(&others, &old.range, delta, old.depth);

        let mut errors = prev.errors.clone();
        errors.extend(new.errors);
        errors.extend(splice.defects.into_iter().map(RollError::SpliceDefect));

        let mut subrolls = splice.kept;
        let kind = if new.subrolls.is_empty() {
            SubrollKind::SubtableLeaf
        } else {
            SubrollKind::SubtableContainer
        };
        for mut span in new.subrolls {
            span.range = shift(&span.range, old.range.start as isize);
            subrolls.push(span);
        }
        subrolls.push(Subroll {
            range: old.range.start..old.range.start + new.text.len(),
            source: old.source.clone(),
            kind,
            original_entry,
            entry_index,
            depth: old.depth,
        });
        subrolls.sort_by(span_order);

        RollResult {
            text,
            subrolls,
            errors,
        }
    }
}

/// Clone the previous result and append a warning; rerolls never throw.
fn no_op(prev: &RollResult, error: RollError) -> RollResult {
    let mut result = prev.clone();
    result.errors.push(error);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tm_core::{Section, TableId};

    use crate::library::TableLibrary;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn table(id: &str, title: &str, sections: &[(&str, &[&str])]) -> Table {
        Table::new(
            TableId::new(id),
            title,
            sections
                .iter()
                .map(|(name, entries)| {
                    Section::new(*name, entries.iter().map(ToString::to_string).collect())
                })
                .collect(),
            Vec::new(),
        )
    }

    fn monster_table() -> Table {
        table(
            "t-0-output",
            "Encounters",
            &[
                ("output", &["You see a [monster]."]),
                ("monster", &["goblin", "orc"]),
            ],
        )
    }

    #[test]
    fn reroll_replaces_the_span_and_repairs_the_wrapper() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let target = first.rerollable()[0];
        let second = roller.reroll(&first, target, &t, &mut rng);

        let pick = &second.text["You see a ".len()..second.text.len() - 1];
        assert!(pick == "goblin" || pick == "orc");
        assert_eq!(second.text, format!("You see a {pick}."));

        let wrapper = &second.subrolls[0];
        assert_eq!(wrapper.source, "output");
        assert_eq!(wrapper.range.end, second.text.len());

        let monster = &second.subrolls[1];
        assert_eq!(monster.source, "monster");
        assert_eq!(second.span_text(1), Some(pick));
        assert_eq!(monster.original_entry, pick);

        // The old result is untouched and still internally consistent.
        assert!(first.nesting_defects().is_empty());
        assert_eq!(first.subrolls.len(), 2);
    }

    #[test]
    fn untouched_spans_keep_their_text_across_a_reroll() {
        let library = TableLibrary::new();
        let t = table(
            "t",
            "T",
            &[
                ("output", &["[adjective] [noun] on a shelf"]),
                ("adjective", &["dusty", "gleaming"]),
                ("noun", &["idol"]),
            ],
        );
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let adjective = first
            .subrolls
            .iter()
            .position(|s| s.source == "adjective")
            .unwrap();
        let noun_text_before = {
            let i = first.subrolls.iter().position(|s| s.source == "noun").unwrap();
            first.span_text(i).unwrap().to_string()
        };

        let second = roller.reroll(&first, adjective, &t, &mut rng);

        let noun_after = second.subrolls.iter().position(|s| s.source == "noun").unwrap();
        assert_eq!(second.span_text(noun_after), Some(noun_text_before.as_str()));
        assert!(second.text.ends_with("idol on a shelf"));
        assert!(second.nesting_defects().is_empty());
        assert!(second.errors.is_empty());
    }

    #[test]
    fn reroll_of_a_container_drops_its_old_nested_spans() {
        let gems = table(
            "gems-0",
            "Gems",
            &[
                ("output", &["a [quality] ruby"]),
                ("quality", &["flawless", "chipped"]),
            ],
        );
        let library = TableLibrary::from_tables(vec![gems]);
        let t = table("t", "T", &[("output", &["You find [Gems]!"])]);
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let reference = first.subrolls.iter().position(|s| s.source == "Gems").unwrap();
        let second = roller.reroll(&first, reference, &t, &mut rng);

        assert!(second.text.starts_with("You find a "));
        assert!(second.text.ends_with(" ruby!"));
        // Same shape as a fresh roll: wrapper, reference, nested
        // wrapper, quality leaf.
        assert_eq!(second.subrolls.len(), 4);
        assert!(second.nesting_defects().is_empty());
        assert!(
            !second
                .errors
                .iter()
                .any(|e| matches!(e, RollError::SpliceDefect(_)))
        );
    }

    #[test]
    fn rerolling_the_wrapper_regenerates_everything() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let second = roller.reroll(&first, 0, &t, &mut rng);

        assert!(second.text.starts_with("You see a "));
        assert_eq!(second.subrolls.len(), 2);
        assert_eq!(second.subrolls[0].range, 0..second.text.len());
        assert!(second.nesting_defects().is_empty());
    }

    #[test]
    fn invalid_target_is_a_noop_with_a_warning() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let result = roller.reroll(&first, 99, &t, &mut rng);

        assert_eq!(result.text, first.text);
        assert_eq!(result.subrolls, first.subrolls);
        assert_eq!(result.errors, vec![RollError::InvalidRerollTarget(99)]);
    }

    #[test]
    fn terminal_spans_cannot_be_rerolled() {
        let library = TableLibrary::new();
        let t = table("t", "T", &[("output", &["take {2d6} gold"])]);
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let terminal = first
            .subrolls
            .iter()
            .position(|s| s.kind == SubrollKind::Terminal)
            .unwrap();
        let result = roller.reroll(&first, terminal, &t, &mut rng);

        assert_eq!(result.text, first.text);
        assert_eq!(result.errors, vec![RollError::NotRerollable(terminal)]);
    }

    #[test]
    fn forcing_output_rerolls_the_whole_table() {
        let library = TableLibrary::new();
        let t = table(
            "t",
            "T",
            &[
                ("output", &["calm seas", "a [monster] attacks"]),
                ("monster", &["kraken", "siren"]),
            ],
        );
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        for index in 0..2 {
            let forced = roller.force(&first, "output", index, &t, &mut rng);
            let wrapper = &forced.subrolls[0];
            assert_eq!(wrapper.entry_index, index);
            assert_eq!(
                wrapper.original_entry,
                t.output().unwrap().entries[index]
            );
        }
    }

    #[test]
    fn forcing_a_section_pins_the_entry_in_place() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let forced = roller.force(&first, "monster", 1, &t, &mut rng);

        assert_eq!(forced.text, "You see a orc.");
        let monster = forced.subrolls.iter().position(|s| s.source == "monster").unwrap();
        assert_eq!(forced.subrolls[monster].entry_index, 1);
        assert_eq!(forced.subrolls[monster].original_entry, "orc");
        assert_eq!(forced.subrolls[0].range.end, forced.text.len());
    }

    #[test]
    fn forcing_an_unknown_section_is_a_noop() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let result = roller.force(&first, "treasure", 0, &t, &mut rng);

        assert_eq!(result.text, first.text);
        assert_eq!(
            result.errors,
            vec![RollError::UnknownSection("treasure".to_string())]
        );
    }

    #[test]
    fn forcing_an_out_of_range_entry_is_a_noop() {
        let library = TableLibrary::new();
        let t = monster_table();
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let result = roller.force(&first, "monster", 7, &t, &mut rng);

        assert_eq!(result.text, first.text);
        assert_eq!(
            result.errors,
            vec![RollError::InvalidEntryIndex {
                section: "monster".to_string(),
                index: 7,
            }]
        );
    }

    #[test]
    fn forcing_a_section_that_never_rolled_is_a_noop() {
        let library = TableLibrary::new();
        let t = table(
            "t",
            "T",
            &[
                ("output", &["calm seas"]),
                ("monster", &["kraken"]),
            ],
        );
        let roller = Roller::new(&library);
        let mut rng = rng();

        let first = roller.roll(&t, &mut rng);
        let result = roller.force(&first, "monster", 0, &t, &mut rng);

        assert_eq!(result.text, "calm seas");
        assert_eq!(
            result.errors,
            vec![RollError::UnknownSection("monster".to_string())]
        );
    }
}
