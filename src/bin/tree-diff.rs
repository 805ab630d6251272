/*!
# tree-diff CLI

Compares two revisions of a C source file and prints edit-script lines
transforming the first into the second.
*/

use anyhow::{Context, Result};
use astgraft::{SyntaxTree, TreeDiff};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tree-diff",
    version = env!("CARGO_PKG_VERSION"),
    about = "Emit an edit script between two C source revisions"
)]
struct Cli {
    /// Original revision
    source: PathBuf,

    /// Changed revision
    destination: PathBuf,

    /// Print the matched node pairs before the script
    #[arg(long)]
    dump_matches: bool,

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

    let src = SyntaxTree::parse_file(&cli.source)
        .with_context(|| format!("parsing {}", cli.source.display()))?;
    let dst = SyntaxTree::parse_file(&cli.destination)
        .with_context(|| format!("parsing {}", cli.destination.display()))?;

    let diff = TreeDiff::new(&src, &dst)?;

    if cli.dump_matches {
        for (s, d) in diff.matches() {
            let src_kind = src.node(s)?.kind;
            let dst_kind = dst.node(d)?.kind;
            println!("Match {src_kind}({s}) to {dst_kind}({d})");
        }
    }

    for op in diff.script()? {
        println!("{op}");
    }
    Ok(())
}
