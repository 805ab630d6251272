/*!
# instrumenter CLI

Rewrites a C source file with every if-condition wrapped in a
`flip_callback(<cond>, <id>)` probe, prepending the callback's forward
declaration. `--locate` instead prints the kind of the first node covering
a line.
*/

use anyhow::{Context, Result};
use astgraft::instrument::{kind_at_line, Instrumenter};
use astgraft::SyntaxTree;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "instrumenter",
    version = env!("CARGO_PKG_VERSION"),
    about = "Wrap if-conditions of a C source file in flip_callback probes"
)]
struct Cli {
    /// Source file to instrument
    source: PathBuf,

    /// Seed for the probe ids (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the node kind covering this line instead of instrumenting
    #[arg(long, value_name = "LINE")]
    locate: Option<usize>,

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

    let tree = SyntaxTree::parse_file(&cli.source)
        .with_context(|| format!("parsing {}", cli.source.display()))?;

    if let Some(line) = cli.locate {
        match kind_at_line(&tree, line) {
            Some(kind) => println!("{kind}"),
            None => anyhow::bail!("no node covers line {line}"),
        }
        return Ok(());
    }

    let mut instrumenter = match cli.seed {
        Some(seed) => Instrumenter::with_seed(seed),
        None => Instrumenter::new(),
    };
    print!("{}", instrumenter.instrument(&tree)?);
    Ok(())
}
