//! Line-based parser for table definition blocks.
//!
//! The grammar is indentation-oriented: a line with no leading
//! whitespace opens a section, a line indented two or more columns is
//! an entry of the current section, and `//` starts a comment that runs
//! to end of line. A handful of headers are special: `title` consumes
//! the next entry line as the table's display title, and `output`,
//! `import` and `plugin` always open sections. A capitalized-words
//! header seen before any title is taken as an inferred title.

use std::ops::Range;

use tm_core::{Section, Table, TableId};

use crate::diagnostics::{Diagnostic, Severity};
use crate::markdown::{extract_code_blocks, is_table_block};
use crate::validate::validate;

/// Result of parsing one definition block.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed table, or `None` when the block is structurally
    /// unusable (no section with at least one entry).
    pub table: Option<Table>,
    /// Everything worth reporting, errors and warnings alike.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Result of parsing every table block in a markdown document.
#[derive(Debug)]
pub struct DocumentParse {
    /// Tables from all structurally valid blocks, in document order.
    pub tables: Vec<Table>,
    /// Diagnostics from all blocks, spans rebased to document offsets.
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentParse {
    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Parse a single definition block into a table with the given id.
pub fn parse_table(source: &str, id: TableId) -> ParseResult {
    finish(source, scan(source), id)
}

/// Parse every `perchance`-tagged code block in a markdown document.
///
/// Table ids are derived from `origin` (any stable name for the
/// document), the block's index among table blocks, and the block's
/// first section name.
pub fn parse_document(source: &str, origin: &str) -> DocumentParse {
    let mut tables = Vec::new();
    let mut diagnostics = Vec::new();

    let blocks: Vec<_> = extract_code_blocks(source)
        .into_iter()
        .filter(is_table_block)
        .collect();

    for (index, block) in blocks.iter().enumerate() {
        let scanned = scan(&block.content);
        let first_section = scanned
            .sections
            .first()
            .map_or_else(|| "table".to_string(), |s| s.name.clone());
        let id = TableId::new(format!("{}-{index}-{first_section}", sanitize(origin)));

        let result = finish(&block.content, scanned, id);
        diagnostics.extend(
            result
                .diagnostics
                .into_iter()
                .map(|d| d.offset(block.content_start)),
        );
        if let Some(table) = result.table {
            tables.push(table);
        }
    }

    DocumentParse {
        tables,
        diagnostics,
    }
}

/// Raw scan output, before structural checks and validation.
struct Scan {
    title: Option<String>,
    sections: Vec<Section>,
    header_spans: Vec<Range<usize>>,
    diagnostics: Vec<Diagnostic>,
}

fn scan(source: &str) -> Scan {
    let mut title: Option<String> = None;
    let mut expecting_title = false;
    let mut sections: Vec<Section> = Vec::new();
    let mut header_spans: Vec<Range<usize>> = Vec::new();
    let mut current: Option<(Section, Range<usize>)> = None;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    fn close(
        current: &mut Option<(Section, Range<usize>)>,
        sections: &mut Vec<Section>,
        header_spans: &mut Vec<Range<usize>>,
    ) {
        if let Some((section, span)) = current.take() {
            sections.push(section);
            header_spans.push(span);
        }
    }

    let mut pos = 0;
    for raw in source.split_inclusive('\n') {
        let line_start = pos;
        pos += raw.len();

        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let span = line_start..line_start + line.len();

        // Comments run from the first "//" to end of line and are
        // stripped before any other processing.
        let content = strip_comment(line);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let indent = content.chars().take_while(|c| c.is_whitespace()).count();
        if indent >= 2 {
            // Entry line.
            if expecting_title && title.is_none() {
                title = Some(trimmed.to_string());
                expecting_title = false;
                continue;
            }
            match current.as_mut() {
                Some((section, _)) => section.entries.push(trimmed.to_string()),
                None => diagnostics.push(Diagnostic::error(
                    span,
                    format!("indented entry \"{trimmed}\" without a table name"),
                )),
            }
        } else if indent == 0 {
            // Section header.
            close(&mut current, &mut sections, &mut header_spans);

            let folded = trimmed.to_lowercase();
            if folded == "title" {
                expecting_title = true;
            } else if matches!(folded.as_str(), "output" | "import" | "plugin") {
                current = Some((Section::new(trimmed, Vec::new()), span));
            } else if title.is_none() && looks_like_title(trimmed) {
                title = Some(trimmed.to_string());
            } else {
                current = Some((Section::new(trimmed, Vec::new()), span));
            }
        }
        // Exactly one column of indentation matches neither rule and is
        // ignored.
    }
    close(&mut current, &mut sections, &mut header_spans);

    Scan {
        title,
        sections,
        header_spans,
        diagnostics,
    }
}

fn finish(source: &str, scanned: Scan, id: TableId) -> ParseResult {
    let Scan {
        title,
        sections,
        header_spans,
        mut diagnostics,
    } = scanned;

    if sections.is_empty() || sections.iter().all(|s| s.entries.is_empty()) {
        let message = if sections.is_empty() {
            "no table sections found"
        } else {
            "no section has any entries"
        };
        diagnostics.push(Diagnostic::error(0..source.len(), message));
        return ParseResult {
            table: None,
            diagnostics,
        };
    }

    diagnostics.extend(validate(title.as_deref(), &sections, &header_spans));

    let title = title.unwrap_or_else(|| sections[0].name.clone());
    let issues = diagnostics.iter().map(ToString::to_string).collect();
    ParseResult {
        table: Some(Table::new(id, title, sections, issues)),
        diagnostics,
    }
}

fn strip_comment(line: &str) -> &str {
    line.find("//").map_or(line, |i| &line[..i])
}

/// A "simple capitalized words" header: an uppercase ASCII letter
/// followed by letters and spaces only.
fn looks_like_title(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_uppercase()
        && text.chars().count() >= 2
        && chars.all(|c| c.is_ascii_alphabetic() || c == ' ')
}

fn sanitize(origin: &str) -> String {
    origin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> TableId {
        TableId::new("test-0-output")
    }

    #[test]
    fn parses_sections_and_entries() {
        let source = "output\n  You see a [monster].\nmonster\n  goblin\n  orc\n";
        let result = parse_table(source, id());
        let table = result.table.as_ref().expect("structurally valid");

        assert_eq!(table.sections.len(), 2);
        assert_eq!(table.sections[0].name, "output");
        assert_eq!(table.sections[0].entries, vec!["You see a [monster]."]);
        assert_eq!(table.sections[1].entries, vec!["goblin", "orc"]);
        assert!(table.references.contains("monster"));
        assert!(!result.has_errors());
    }

    #[test]
    fn title_header_consumes_next_entry() {
        let source = "title\n  Wilderness Encounters\noutput\n  a wolf\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.title, "Wilderness Encounters");
        assert_eq!(table.sections.len(), 1);
    }

    #[test]
    fn capitalized_header_becomes_inferred_title() {
        let source = "Dungeon Rooms\noutput\n  a damp cell\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.title, "Dungeon Rooms");
        assert_eq!(table.sections.len(), 1);
    }

    #[test]
    fn inferred_title_only_applies_once() {
        // Once a title exists, capitalized headers open sections.
        let source = "Dungeon Rooms\nOddities\n  a talking skull\noutput\n  [Oddities]\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.title, "Dungeon Rooms");
        assert_eq!(table.sections[0].name, "Oddities");
    }

    #[test]
    fn output_header_never_becomes_a_title() {
        // "Output" fits the capitalized-words pattern but is reserved.
        let source = "Output\n  a wolf\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.sections[0].name, "Output");
        assert_eq!(table.title, "Output");
    }

    #[test]
    fn comments_and_blank_lines_are_stripped() {
        let source = "// a comment line\noutput // trailing comment\n\n  gold // so shiny\n   // indented comment only\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.sections.len(), 1);
        assert_eq!(table.sections[0].entries, vec!["gold"]);
    }

    #[test]
    fn orphan_entry_is_an_error_but_not_fatal() {
        let source = "  stray entry\noutput\n  a wolf\n";
        let result = parse_table(source, id());
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.message.contains("without a table name"))
        );
        assert!(result.table.is_some());
    }

    #[test]
    fn empty_definition_fails_structurally() {
        let result = parse_table("", id());
        assert!(result.table.is_none());
        assert!(result.has_errors());
    }

    #[test]
    fn sections_without_entries_fail_structurally() {
        let result = parse_table("output\nmonster\n", id());
        assert!(result.table.is_none());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.message == "no section has any entries")
        );
    }

    #[test]
    fn title_falls_back_to_first_section_name() {
        let source = "weather\n  drizzle\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.title, "weather");
    }

    #[test]
    fn single_column_indent_is_ignored() {
        let source = "output\n stray\n  kept\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.sections[0].entries, vec!["kept"]);
    }

    #[test]
    fn crlf_definitions_parse() {
        let source = "output\r\n  a wolf\r\nmonster\r\n  goblin\r\n";
        let table = parse_table(source, id()).table.unwrap();
        assert_eq!(table.sections[0].entries, vec!["a wolf"]);
        assert_eq!(table.sections[1].entries, vec!["goblin"]);
    }

    #[test]
    fn parse_document_extracts_only_table_blocks() {
        let doc = "# Tables\n\n\
            ```perchance\noutput\n  a [monster]\nmonster\n  goblin\n```\n\n\
            ```python\nprint('hi')\n```\n\n\
            ```perchance\ntitle\n  Loot\noutput\n  {2d6} coins\n```\n";
        let parsed = parse_document(doc, "vault/tables.md");

        assert_eq!(parsed.tables.len(), 2);
        assert_eq!(parsed.tables[0].id.as_str(), "vault-tables-md-0-output");
        assert_eq!(parsed.tables[1].title, "Loot");
        assert_eq!(parsed.tables[1].id.as_str(), "vault-tables-md-1-output");
        assert!(!parsed.has_errors());
    }

    #[test]
    fn parse_document_rebases_diagnostic_spans() {
        let doc = "prose\n\n```perchance\n  orphan\noutput\n  a wolf\n```\n";
        let parsed = parse_document(doc, "t.md");
        assert_eq!(parsed.tables.len(), 1);

        let diag = parsed
            .diagnostics
            .iter()
            .find(|d| d.message.contains("without a table name"))
            .expect("orphan entry diagnostic");
        assert_eq!(&doc[diag.span.clone()], "  orphan");
    }
}
