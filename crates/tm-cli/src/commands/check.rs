use std::path::Path;

pub fn run(path: &Path) -> Result<(), String> {
    let parsed = super::parse_file(path)?;

    if parsed.has_errors() {
        return Err("definition errors found".into());
    }

    let table_word = if parsed.tables.len() == 1 { "table" } else { "tables" };
    println!(
        "  {} {table_word} parsed from {}.",
        parsed.tables.len(),
        path.display()
    );
    for table in &parsed.tables {
        println!(
            "    {} ({} sections, {} entries)",
            table.title,
            table.sections.len(),
            table.entry_count()
        );
    }

    Ok(())
}
