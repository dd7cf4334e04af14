use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check_config::{self, CheckConfigArgs},
    suppress::{self, SuppressArgs},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sdc", version, about = "Statistical disclosure control for tabular data")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run primary and secondary suppression over a CSV table.
    Suppress(SuppressArgs),
    /// Validate a YAML configuration and print it with defaults filled in.
    CheckConfig(CheckConfigArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let default_filter = ["sdc_cli", "sdc_rules", "sdc_graph", "sdc_solve", "sdc_plan"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Suppress(args) => suppress::run(&args),
        Command::CheckConfig(args) => check_config::run(&args),
    }
}
