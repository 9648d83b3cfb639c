//! CLI frontend for Tablemancer.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tablemancer",
    about = "Tablemancer — roll on random tables defined in markdown",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a markdown file and report table diagnostics
    Check {
        /// Markdown file containing table definition blocks
        file: PathBuf,
    },

    /// List the tables defined in a markdown file
    List {
        /// Markdown file containing table definition blocks
        file: PathBuf,
    },

    /// Roll on a table and print the result
    Roll {
        /// Markdown file containing table definition blocks
        file: PathBuf,

        /// Table title or id (defaults to the file's only table)
        table: Option<String>,

        /// RNG seed for deterministic rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the subroll span table
        #[arg(long)]
        spans: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Reroll subrolls interactively by index
        #[arg(short, long)]
        interactive: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::List { file } => commands::list::run(&file),
        Commands::Roll {
            file,
            table,
            seed,
            spans,
            json,
            interactive,
        } => commands::roll::run(&file, table.as_deref(), seed, spans, json, interactive),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
