//! CLI argument definitions using clap
//!
//! Commands:
//! - carebase serve [--config <path>] [--ephemeral]
//! - carebase check-config [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// carebase - schema-validated document store for elder care requests
#[derive(Parser, Debug)]
#[command(name = "carebase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (default: ./carebase.json when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep records in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Validate configuration and record types, then exit
    CheckConfig {
        /// Path to configuration file (default: ./carebase.json when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
