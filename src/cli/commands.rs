//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scanguard operator CLI
#[derive(Parser, Debug)]
#[command(name = "scanguard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Guard configuration file (YAML); environment variables when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the login endpoint with the configured credentials
    Check,

    /// Decode the expiry claim of a token
    Inspect {
        /// Compact JWT to inspect
        token: String,
    },

    /// Validate the guard configuration
    Validate,
}
