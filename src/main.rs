//! Reanalysis worker main executable

pub mod classify;
pub mod common;
pub mod comphet;
pub mod conf;
pub mod err;
pub mod moi;
pub mod panel;
pub mod ped;
pub mod pipeline;
pub mod results;
pub mod validate;
pub mod variant;

use clap::{Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Rare disease variant reanalysis",
    long_about = "This tool classifies annotated variants and checks them against the \
                  modes of inheritance of a gene panel"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify annotated variants.
    Classify(classify::Args),
    /// Run inheritance tests on classified variants.
    Validate(validate::Args),
    /// Classify and validate in one go.
    Run(pipeline::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Classify(args) => classify::run(&cli.common, args)?,
            Commands::Validate(args) => validate::run(&cli.common, args)?,
            Commands::Run(args) => pipeline::run(&cli.common, args)?,
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
