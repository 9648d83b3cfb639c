//! Reference-graph validation for parsed sections.
//!
//! Validation never blocks a table: everything here is a warning the
//! caller can display. Cycles in particular are only surfaced — the
//! resolution engine bounds its recursion depth regardless, so an
//! undetected cycle degrades instead of hanging.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tm_core::Section;
use tm_core::markers::reference_names;

use crate::diagnostics::Diagnostic;

/// Validate sections after parsing, returning warnings.
///
/// `header_spans` is parallel to `sections` and locates each section's
/// header line; pass an empty slice when spans are unknown.
pub fn validate(
    title: Option<&str>,
    sections: &[Section],
    header_spans: &[Range<usize>],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let span_of = |index: usize| header_spans.get(index).cloned().unwrap_or(0..0);

    for (index, section) in sections.iter().enumerate() {
        if section.name.trim().is_empty() {
            diagnostics.push(Diagnostic::warning(
                span_of(index),
                "found section without a name",
            ));
            continue;
        }

        if section.entries.is_empty() {
            diagnostics.push(Diagnostic::warning(
                span_of(index),
                format!("section \"{}\" has no entries", section.name),
            ));
            continue;
        }

        if section.name.contains(char::is_whitespace) && Some(section.name.as_str()) != title {
            diagnostics.push(Diagnostic::warning(
                span_of(index),
                format!(
                    "section name \"{}\" contains spaces (use hyphens for referenced names)",
                    section.name
                ),
            ));
        }

        let empty_entries = section.entries.iter().filter(|e| e.trim().is_empty()).count();
        if empty_entries > 0 {
            diagnostics.push(Diagnostic::warning(
                span_of(index),
                format!(
                    "section \"{}\" contains {empty_entries} empty entries",
                    section.name
                ),
            ));
        }
    }

    for name in cycle_starts(sections) {
        let index = sections.iter().position(|s| s.name == name).unwrap_or(0);
        diagnostics.push(Diagnostic::warning(
            span_of(index),
            format!("circular reference: section \"{name}\" eventually references itself"),
        ));
    }

    diagnostics
}

/// Names of sections from which a reference cycle is reachable.
fn cycle_starts(sections: &[Section]) -> Vec<String> {
    let by_name: HashMap<String, &Section> = sections
        .iter()
        .map(|s| (s.name.to_lowercase(), s))
        .collect();

    let mut starts = Vec::new();
    for section in sections {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        if dfs(&section.name.to_lowercase(), &by_name, &mut visited, &mut stack) {
            starts.push(section.name.clone());
        }
    }
    starts
}

/// Depth-first search with an explicit recursion stack; a name
/// reappearing on the active stack is a cycle.
fn dfs(
    name: &str,
    by_name: &HashMap<String, &Section>,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> bool {
    if stack.iter().any(|n| n == name) {
        return true;
    }
    if !visited.insert(name.to_string()) {
        return false;
    }
    stack.push(name.to_string());

    let mut found = false;
    if let Some(section) = by_name.get(name) {
        'entries: for entry in &section.entries {
            for reference in reference_names(entry) {
                let folded = reference.to_lowercase();
                if by_name.contains_key(&folded) && dfs(&folded, by_name, visited, stack) {
                    found = true;
                    break 'entries;
                }
            }
        }
    }
    stack.pop();
    found
}
