mod commands;
mod config;
mod loader;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "openfest")]
#[command(about = "Check festival schedule directories before they ship")]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an event directory and report every problem found
    Validate {
        /// Event directory (containing event-info.yml)
        path: PathBuf,

        /// Stop at the first error
        #[arg(long)]
        fail_fast: bool,

        /// Resolve stages on a single thread
        #[arg(long)]
        sequential: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load()?;

    match cli.command {
        Commands::Validate {
            path,
            fail_fast,
            sequential,
            json,
        } => {
            let options = config.parse_options(fail_fast, sequential);
            commands::validate::run(&path, options, json)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
