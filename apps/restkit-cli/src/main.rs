//! `restkit`: inspect contract catalogs without writing a client.
//!
//! # Usage
//!
//! ```bash
//! # Build every descriptor and report failures
//! restkit validate contracts/users.yaml contracts/orders.yaml
//!
//! # Print descriptors of one contract as JSON
//! restkit describe contracts/users.yaml --contract userapi --json
//!
//! # Resolve a request against concrete arguments
//! restkit --config restkit.yaml expand contracts/users.yaml \
//!     --contract userapi --operation find --arg 42 --arg '["name"]'
//! ```

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{DescribeArgs, ExpandArgs, ValidateArgs};

/// Validate, describe and expand declarative HTTP contract catalogs
#[derive(Parser, Debug)]
#[command(name = "restkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (endpoints, properties, extra catalogs)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every descriptor of every contract and report errors
    Validate(ValidateArgs),
    /// Print the resolved descriptors
    Describe(DescribeArgs),
    /// Expand one operation against arguments and print the request
    Expand(ExpandArgs),
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Validate(args) => args.run(config, &mut stdout),
        Commands::Describe(args) => args.run(config, &mut stdout),
        Commands::Expand(args) => args.run(config, &mut stdout),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
