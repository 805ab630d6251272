/*!
# tree-dump CLI

Dumps the syntax tree of a C source file with node attributes and
children, as JSON or indented text.
*/

use anyhow::{Context, Result};
use astgraft::tree::json;
use astgraft::SyntaxTree;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tree-dump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Dump the syntax tree of a C source file"
)]
struct Cli {
    /// Source file to parse
    source: PathBuf,

    /// Output format (json, text)
    #[arg(short = 'f', long, default_value = "json")]
    format: String,

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

    match cli.format.as_str() {
        "json" => {
            let doc = json::dump_json(&tree)?;
            println!("{}", serde_json::to_string(&doc)?);
        }
        "text" => print!("{}", json::dump_text(&tree)?),
        other => anyhow::bail!("unknown format {other:?}, expected json or text"),
    }
    Ok(())
}
