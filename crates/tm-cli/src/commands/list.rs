use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path) -> Result<(), String> {
    let parsed = super::parse_file(path)?;

    if parsed.tables.is_empty() {
        println!("  No tables found.");
        return Ok(());
    }

    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["Title", "Id", "Sections", "Entries", "References"]);

    for table in &parsed.tables {
        let references = if table.references.is_empty() {
            "—".to_string()
        } else {
            table
                .references
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.add_row(vec![
            table.title.clone(),
            table.id.to_string(),
            table.sections.len().to_string(),
            table.entry_count().to_string(),
            references,
        ]);
    }

    println!("{out}");
    println!();
    println!("  {} tables", parsed.tables.len());

    Ok(())
}
