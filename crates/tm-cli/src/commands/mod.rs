pub mod check;
pub mod list;
pub mod roll;

use std::path::Path;

use tm_dsl::{DocumentParse, Severity, render_diagnostics};

/// Parse a markdown file's table blocks and print diagnostics to stderr.
fn parse_file(path: &Path) -> Result<DocumentParse, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let parsed = tm_dsl::parse_document(&source, &path.display().to_string());
    print_diagnostics(&source, path, &parsed);
    Ok(parsed)
}

/// Render diagnostics with ariadne and summarize the counts.
fn print_diagnostics(source: &str, path: &Path, parsed: &DocumentParse) {
    if parsed.diagnostics.is_empty() {
        return;
    }

    let filename = path.display().to_string();
    let rendered = render_diagnostics(source, &filename, &parsed.diagnostics);
    eprint!("{rendered}");

    let errors = parsed
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = parsed.diagnostics.len() - errors;

    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    } else {
        eprintln!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}
