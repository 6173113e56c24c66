//! Dice roll client binary.
//!
//! Composition root that loads configuration, installs logging, and runs one
//! command against a fresh roll session.
//!
//! # Examples
//!
//! ```bash
//! # Free roll with a bonus
//! cargo run -p dice-client -- roll "1d20+3"
//!
//! # Skill check, sacrificing the second die, printed as JSON
//! cargo run -p dice-client -- roll 2d8 --purpose skill-lore --sacrifice 1 --json
//!
//! # Inspect stored roll text
//! cargo run -p dice-client -- replay "20:17;6:3,5"
//! ```

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Replay, Roll};

/// Roll dice through the animated sequence and print the result
#[derive(Parser)]
#[command(name = "dice")]
#[command(about = "Dice roll engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this directory
    #[arg(long, global = true, env = "DICE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Roll dice notation through a full sequence
    Roll(Roll),

    /// Decode stored roll text and show the recomputed record
    Replay(Replay),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Command::Roll(cmd) => cmd.execute().await,
        Command::Replay(cmd) => cmd.execute(),
    }
}
