//! Command-line front end.
//!
//! `seibiki lookup <TEXT>` prints annotated words as JSON; with no text it
//! reads one query per line from stdin. `seibiki audit <CSV>...` checks IPADIC
//! lexicon files (UTF-8) against the dictionary and reports tag tuples the
//! relevance table filters out completely.

use std::error::Error;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seibiki::audit::{audit_lexicon, parse_lexicon_row};
use seibiki::config::{AnalyzerConfig, StoreConfig};
use seibiki::{Dictionary, MemoryCache, Seibiki, SeibikiConfig, TagRelevanceTable};

#[derive(Parser, Debug)]
#[clap(name = "seibiki", about = "Annotates Japanese text with context-filtered dictionary entries")]
struct Args {
    /// Dictionary entries as a JSON array (overrides SEIBIKI_DICTIONARY).
    #[clap(short = 'd', long, global = true)]
    dictionary: Option<PathBuf>,

    /// mecab binary (overrides SEIBIKI_MECAB).
    #[clap(long, global = true)]
    mecab: Option<PathBuf>,

    /// mecab system dictionary directory (overrides SEIBIKI_MECAB_DICDIR).
    #[clap(long, global = true)]
    dicdir: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[clap(short = 'p', long, global = true)]
    pretty: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze and annotate text.
    Lookup {
        /// Query text. Reads lines from stdin when omitted.
        text: Option<String>,
    },
    /// Report relevance-table coverage gaps over IPADIC lexicon CSV files.
    Audit {
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },
}

fn config(args: &Args) -> SeibikiConfig {
    let mut config = SeibikiConfig::from_env();
    if let Some(path) = &args.dictionary {
        config.store = StoreConfig::JsonFile { path: path.clone() };
    }
    let AnalyzerConfig::Mecab { program, dicdir } = &mut config.analyzer;
    if let Some(mecab) = &args.mecab {
        *program = mecab.clone();
    }
    if let Some(dir) = &args.dicdir {
        *dicdir = Some(dir.clone());
    }
    config
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize, pretty: bool) -> Result<(), Box<dyn Error>> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

async fn lookup(args: &Args, config: &SeibikiConfig, text: Option<&str>) -> Result<(), Box<dyn Error>> {
    let seibiki = Seibiki::from_config(config)?;
    let mut out = BufWriter::new(std::io::stdout().lock());

    match text {
        Some(text) => {
            let words = seibiki.process(text).await?;
            write_json(&mut out, &words, args.pretty)?;
        }
        None => {
            for line in std::io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let words = seibiki.process(&line).await?;
                write_json(&mut out, &words, args.pretty)?;
            }
        }
    }
    Ok(())
}

async fn audit(args: &Args, config: &SeibikiConfig, files: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let store = config.store.open()?;
    if store.is_empty() {
        tracing::warn!("dictionary is empty; every row will be reported as having no entries");
    }
    let dictionary = Dictionary::new(store, MemoryCache::new());
    let table = TagRelevanceTable::ipadic()?;

    let mut rows = Vec::new();
    for file in files {
        let text = std::fs::read_to_string(file)?;
        let before = rows.len();
        rows.extend(text.lines().filter_map(parse_lexicon_row));
        tracing::info!(file = %file.display(), rows = rows.len() - before, "read lexicon");
    }

    let report = audit_lexicon(&dictionary, &table, rows).await;
    tracing::info!(
        checked = report.rows_checked,
        with_entries = report.rows_with_entries,
        flagged = report.flagged(),
        "audit finished"
    );
    let mut out = BufWriter::new(std::io::stdout().lock());
    write_json(&mut out, &report, args.pretty)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = config(&args);

    match &args.command {
        Command::Lookup { text } => lookup(&args, &config, text.as_deref()).await,
        Command::Audit { files } => audit(&args, &config, files).await,
    }
}
