use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use comfy_table::ContentArrangement;
use rand::SeedableRng;
use rand::rngs::StdRng;

use tm_core::{RollResult, Table};
use tm_roll::{Roller, TableLibrary};

pub fn run(
    path: &Path,
    name: Option<&str>,
    seed: Option<u64>,
    spans: bool,
    json: bool,
    interactive: bool,
) -> Result<(), String> {
    let parsed = super::parse_file(path)?;
    let library = TableLibrary::from_tables(parsed.tables);
    if library.is_empty() {
        return Err(format!("no tables found in {}", path.display()));
    }

    let table = match name {
        Some(name) => library
            .get(name)
            .ok_or_else(|| format!("no table named \"{name}\""))?,
        None if library.len() == 1 => &library.tables()[0],
        None => {
            return Err(format!(
                "{} tables in {}; pick one (try `tablemancer list`)",
                library.len(),
                path.display()
            ));
        }
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let roller = Roller::new(&library);
    let result = roller.roll(table, &mut rng);

    if json {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    print_result(&result);
    if spans {
        print_spans(&result);
    }
    if interactive {
        run_interactive(roller, table, result, &mut rng)?;
    }

    Ok(())
}

fn print_result(result: &RollResult) {
    println!("  {}", result.text.bold());
    for error in &result.errors {
        println!("  {}", error.to_string().yellow());
    }
}

fn print_spans(result: &RollResult) {
    let mut out = comfy_table::Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["#", "Source", "Kind", "Depth", "Range", "Text"]);

    for (index, span) in result.subrolls.iter().enumerate() {
        out.add_row(vec![
            index.to_string(),
            span.source.clone(),
            span.kind.to_string(),
            span.depth.to_string(),
            format!("{}..{}", span.range.start, span.range.end),
            result.span_text(index).unwrap_or_default().to_string(),
        ]);
    }

    println!("{out}");
}

fn run_interactive(
    roller: Roller<'_>,
    table: &Table,
    mut current: RollResult,
    rng: &mut StdRng,
) -> Result<(), String> {
    println!("  Enter a subroll number to reroll, 'r' for a fresh roll, 'q' to quit.");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print_options(&current);
        print!("reroll> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.eq_ignore_ascii_case("r") {
            current = roller.roll(table, rng);
            print_result(&current);
            continue;
        }

        match input.parse::<usize>() {
            Ok(index) => {
                current = roller.reroll(&current, index, table, rng);
                print_result(&current);
            }
            Err(_) => println!("  {}", "enter a subroll number, 'r', or 'q'".yellow()),
        }
    }

    Ok(())
}

fn print_options(result: &RollResult) {
    for index in result.rerollable() {
        let span = &result.subrolls[index];
        let text = result.span_text(index).unwrap_or_default();
        println!("  [{index}] {}: {}", span.source, text.cyan());
    }
}
