#![allow(clippy::print_stdout, clippy::print_stderr)]

mod args;
mod catalog;
mod handlers;
mod logging;

use crate::args::{Cli, Commands};
use anyhow::{Context as _, Result};
use clap::Parser;
use flagpole::Registry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let catalog = catalog::builtin();
    let mut registry = Registry::load(&cli.config, &catalog)
        .with_context(|| format!("Failed to load features from {}", cli.config.display()))?;

    if cli.strict {
        registry.set_strict(true);
    }
    if cli.no_preserve {
        registry.set_preserve(false);
    }

    match cli.command {
        Commands::List {} => handlers::list(&registry),
        Commands::Eval { names, context } => handlers::eval(&mut registry, &names, &context)?,
        Commands::Snapshot { context, pretty } => handlers::snapshot(&mut registry, &context, pretty)?,
    }

    Ok(())
}
