//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Live annotation recorder.
///
/// Starts an interactive session: every input line becomes a tag stamped
/// with elapsed time, and `!`-prefixed commands edit, move, or delete
/// recorded tags.
#[derive(Debug, Parser)]
#[command(name = "lt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
