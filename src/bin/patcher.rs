/*!
# patcher CLI

Applies an edit script to the target program and writes the rewritten
source to stdout. Node payloads come from the destination revision,
identifiers are translated through the variable map, and call statements on
skip-listed lines are elided from inserted text.
*/

use anyhow::{Context, Result};
use astgraft::{EditScript, Patcher, SkipList, SyntaxTree, VariableMap};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "patcher",
    version = env!("CARGO_PKG_VERSION"),
    about = "Apply a structural edit script to a target C source file"
)]
struct Cli {
    /// Donor program, original revision
    #[arg(long)]
    source: PathBuf,

    /// Donor program, patched revision
    #[arg(long)]
    destination: PathBuf,

    /// Program to rewrite
    #[arg(long)]
    target: PathBuf,

    /// Edit script path
    #[arg(long)]
    script: PathBuf,

    /// Variable mapping path (source-path:target-path per line)
    #[arg(long)]
    map: PathBuf,

    /// Skip list path (one line number per line)
    #[arg(long)]
    skip_list: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("astgraft={log_level}"))
        .with_writer(std::io::stderr)
        .init();

    // All three slots must build; a front-end failure on any of them
    // aborts before any edit is attempted.
    let _source = SyntaxTree::parse_file(&cli.source)
        .with_context(|| format!("parsing {}", cli.source.display()))?;
    let destination = SyntaxTree::parse_file(&cli.destination)
        .with_context(|| format!("parsing {}", cli.destination.display()))?;
    let target = SyntaxTree::parse_file(&cli.target)
        .with_context(|| format!("parsing {}", cli.target.display()))?;

    let script = EditScript::load(&cli.script)
        .with_context(|| format!("loading script {}", cli.script.display()))?;
    let map = VariableMap::load(&cli.map)
        .with_context(|| format!("loading variable map {}", cli.map.display()))?;
    let skip_list = match &cli.skip_list {
        Some(path) => SkipList::load(path)
            .with_context(|| format!("loading skip list {}", path.display()))?,
        None => SkipList::default(),
    };

    let mut patcher = Patcher::new(&destination, &target, &map, &skip_list);
    patcher.apply(&script)?;
    print!("{}", patcher.finish()?);
    Ok(())
}
