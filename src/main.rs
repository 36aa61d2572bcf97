//! Thin CLI front end (§1: "JSON in, JSON out; no human-readable
//! rendering, no argument sugar beyond what's needed to name a project
//! and a query"). Two subcommands: `index` builds or refreshes a
//! project's persistent index, `query` runs a single typed [`Query`]
//! against it. `anyhow` is used only here, at the process boundary,
//! wrapping the crate's own [`ucn::UcnError`] for `main`'s `?`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ucn::query::{execute, Query};
use ucn::{cache, logging, query, Settings};

#[derive(Parser)]
#[command(name = "ucn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Polyglot source-code navigator: build a symbol index, run structural queries over it")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or refresh a project's persistent index.
    Index {
        /// Project root to index.
        path: PathBuf,

        /// Rebuild from scratch even if a fresh cache already exists.
        #[arg(short, long)]
        force: bool,
    },

    /// Run a single structural query against a project's index.
    Query {
        /// Project root the index was (or will be) built for.
        path: PathBuf,

        /// The query as a JSON-encoded `{"query": "...", ...}` object.
        /// Read from stdin when omitted.
        #[arg(long)]
        json: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Index { path, force } => run_index(&path, force),
        Commands::Query { path, json } => run_query(&path, json),
    }
}

fn run_index(path: &Path, force: bool) -> Result<()> {
    let settings = Arc::new(Settings::load(path)?);
    logging::init_with_config(&settings.logging);

    let (index, cache_hit) = if force {
        let index = ucn::build_project(path, settings.clone())?;
        cache::save(&index, &cache::default_cache_path(path, &settings))?;
        (index, false)
    } else {
        cache::load_or_build(path, settings)?
    };

    tracing::info!(cache_hit, files = index.files().count(), "index ready");
    let summary = query::stats(&index);
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn run_query(path: &Path, json: Option<String>) -> Result<()> {
    let settings = Arc::new(Settings::load(path)?);
    logging::init_with_config(&settings.logging);

    let raw = match json {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let parsed: Query = serde_json::from_str(&raw)?;

    let (index, cache_hit) = cache::load_or_build(path, settings)?;
    tracing::debug!(cache_hit, "index loaded for query");

    let output = execute(&index, parsed)?;
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
