//! Command implementations

mod analyze;
mod config;
mod grounds;
mod list;
mod review;
mod submit;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = crate::config::load(&cli)?;

    match cli.command {
        Commands::Grounds(args) => grounds::execute(args, &config, &output).await,
        Commands::Analyze(args) => analyze::execute(args, &config, &output).await,
        Commands::Submit(args) => submit::execute(args, &cli.store, &config, &output).await,
        Commands::Review(args) => review::execute(args, &cli.store, &output).await,
        Commands::List(args) => list::execute(args, &cli.store, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}
