//! Command-line entry point for importing and browsing a corpus database.
//!
//! # Responsibility
//! - Compose config, logging and `CorpusApp` explicitly.
//! - Print query results as plain text or JSON lines.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use scripture_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use scripture_core::{init_logging, CoreConfig, CorpusApp, CorpusDocument};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scripture", version, about = "Browse and search a translated verse corpus")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; file logging is off when unset
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    log_dir: Option<String>,

    /// Print one JSON object per line instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import one translation from a JSON corpus document
    Import {
        /// Path to the corpus document
        file: PathBuf,
    },
    /// List imported translations
    Translations,
    /// List books of a translation
    Books {
        /// Translation short name, e.g. kjv
        code: String,
    },
    /// Print the verses of one chapter
    Verses { book_id: i64, chapter: u32 },
    /// Find verses containing TEXT (case-sensitive, at most 100)
    Search { text: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = &config.log_dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(&config.log_level, log_dir)?;
    }

    let app = CorpusApp::open(&config)
        .with_context(|| format!("failed to open corpus database {}", config.db_path.display()))?;
    info!("event=cli_start module=cli status=ok");
    run(&cli, &app)
}

/// Flags already carry their environment fallback (clap `env`), so they are
/// the only lookup source; trimming and defaults come from `CoreConfig`.
fn resolve_config(cli: &Cli) -> CoreConfig {
    CoreConfig::from_lookup(|key| match key {
        DB_PATH_ENV => cli.db.clone(),
        LOG_LEVEL_ENV => cli.log_level.clone(),
        LOG_DIR_ENV => cli.log_dir.clone(),
        _ => None,
    })
}

fn run(cli: &Cli, app: &CorpusApp) -> Result<()> {
    let use_cases = app.use_cases();
    match &cli.command {
        Commands::Import { file } => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let document = CorpusDocument::from_json(&text)?;
            let summary = app.repository().import_corpus(&document)?;
            if cli.json {
                print_json(&summary)?;
            } else {
                println!(
                    "imported {}: {} book(s), {} verse(s)",
                    document.translation.short_name, summary.books, summary.verses
                );
            }
        }
        Commands::Translations => {
            for translation in use_cases.get_translations.execute()? {
                if cli.json {
                    print_json(&translation)?;
                } else {
                    println!(
                        "{}\t{}\t{}\t{} bytes",
                        translation.short_name, translation.name, translation.language, translation.size
                    );
                }
            }
        }
        Commands::Books { code } => {
            for book in use_cases.get_books.execute(code)? {
                if cli.json {
                    print_json(&book)?;
                } else {
                    println!("{}\t{}\t{}", book.id, book.short_name, book.name);
                }
            }
        }
        Commands::Verses { book_id, chapter } => {
            for verse in use_cases.get_verses.execute(*book_id, *chapter)? {
                if cli.json {
                    print_json(&verse)?;
                } else {
                    println!("{}\t{}", verse.reference(), verse.text);
                }
            }
        }
        Commands::Search { text } => {
            for verse in use_cases.search_verses.execute(text)? {
                if cli.json {
                    print_json(&verse)?;
                } else {
                    println!("{}\t{}\t{}", verse.book_id, verse.reference(), verse.text);
                }
            }
        }
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
