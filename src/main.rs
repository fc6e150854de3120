use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aprova::cli::{Cli, Commands};
use aprova::commands::{evaluate, fetch_data};

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "aprova=info",
        1 => "aprova=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Evaluate(args) => evaluate::run(&cli, args),
        Commands::FetchData(args) => fetch_data::run(&cli, args),
    }
}
