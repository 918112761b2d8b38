mod cli;
mod client;
mod config;
mod configure;
mod converter;
mod document;
mod error;
mod result;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Some(Command::Configure(args)) => configure::configure(args),
        None => match &cli.ocr.input {
            Some(input) => converter::convert(&cli.ocr, input),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}
