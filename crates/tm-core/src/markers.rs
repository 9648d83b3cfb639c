//! Scanner for the two inline markers a table entry can contain:
//! `[name]` subtable references and `{expr}` dice expressions.
//!
//! Matching is deliberately non-nested: the first `]` after a `[`
//! closes the reference and the inner text is taken verbatim, so a
//! malformed entry degrades to literal text instead of an error.

use std::ops::Range;

/// One inline marker found in an entry's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A `[name]` subtable reference. `name` is the trimmed inner text.
    Reference {
        /// Byte range of the whole `[name]` literal, brackets included.
        range: Range<usize>,
        /// Trimmed inner text.
        name: String,
    },
    /// A `{expr}` candidate dice expression. `expr` is the trimmed
    /// inner text; whether it actually parses as dice is decided by the
    /// roll engine.
    Dice {
        /// Byte range of the whole `{expr}` literal, braces included.
        range: Range<usize>,
        /// Trimmed inner text.
        expr: String,
    },
}

impl Marker {
    /// Byte range of the marker literal in the scanned text.
    pub fn range(&self) -> &Range<usize> {
        match self {
            Self::Reference { range, .. } | Self::Dice { range, .. } => range,
        }
    }

    /// The trimmed inner text, without the surrounding delimiters.
    pub fn inner(&self) -> &str {
        match self {
            Self::Reference { name, .. } => name,
            Self::Dice { expr, .. } => expr,
        }
    }
}

/// Scan `text` left to right for `[name]` and `{expr}` markers.
///
/// Markers never overlap; scanning resumes after each closing
/// delimiter. Unclosed delimiters and empty inner text (`[]`, `[ ]`)
/// produce no marker.
pub fn scan_markers(text: &str) -> Vec<Marker> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let close = match bytes[i] {
            b'[' => b']',
            b'{' => b'}',
            _ => {
                i += 1;
                continue;
            }
        };

        let Some(end) = bytes[i + 1..].iter().position(|&b| b == close) else {
            i += 1;
            continue;
        };
        let end = i + 1 + end;
        let inner = text[i + 1..end].trim();

        if !inner.is_empty() {
            let range = i..end + 1;
            markers.push(if close == b']' {
                Marker::Reference {
                    range,
                    name: inner.to_string(),
                }
            } else {
                Marker::Dice {
                    range,
                    expr: inner.to_string(),
                }
            });
        }
        i = end + 1;
    }

    markers
}

/// Collect the distinct reference names in `text`, in first-seen order.
pub fn reference_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for marker in scan_markers(text) {
        let Marker::Reference { name, .. } = marker else {
            continue;
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
