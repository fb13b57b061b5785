//! # CLI Argument Definitions
//!
//! Command-line structure of the `flagpole` binary, defined with `clap` derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Evaluate feature toggles from a configuration file.
#[derive(Debug, Parser)]
#[command(name = "flagpole")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Evaluate feature toggles defined in a configuration file")]
pub(crate) struct Cli {
    /// Feature configuration file (TOML, JSON or YAML)
    #[arg(short = 'f', long, global = true, default_value = "flagpole.toml")]
    pub config: PathBuf,

    /// Fail on unknown feature names instead of reporting them as inactive
    #[arg(long, global = true)]
    pub strict: bool,

    /// Re-evaluate processors on every lookup
    #[arg(long, global = true)]
    pub no_preserve: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// List registered features in configuration order
    List {},
    /// Print `name=true|false` for each requested feature
    Eval {
        /// Feature names to evaluate
        #[arg(required = true)]
        names: Vec<String>,

        /// Context entry as `key=value`; values are parsed as JSON when possible
        #[arg(short, long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,
    },
    /// Print the decision of every feature as a JSON object
    Snapshot {
        /// Context entry as `key=value`; values are parsed as JSON when possible
        #[arg(short, long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}
