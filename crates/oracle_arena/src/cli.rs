//! Command-line interface for oracle-arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Oracle Arena - score tic-tac-toe progress oracles against ground truth
#[derive(Parser, Debug)]
#[command(name = "oracle-arena")]
#[command(about = "Tic-tac-toe session engine with live oracle scoring", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Path to a TOML config file (falls back to $ORACLE_ARENA_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Play in the terminal against the random opponent
    Play {
        /// Path to a TOML config file (falls back to $ORACLE_ARENA_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the automated player
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the ground-truth label of a board, e.g. "XX_O_____"
    Classify {
        /// Nine cells of X, O, or _ (separators , and | are ignored)
        board: String,
    },
}
