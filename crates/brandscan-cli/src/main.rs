mod discover;
mod report;
mod scan;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::discover::DiscoverArgs;
use crate::scan::ScanArgs;

#[derive(Debug, Parser)]
#[command(name = "brandscan")]
#[command(about = "Find the pages of a site that mention your brands and products")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan sites for the brands and products in a catalog
    Scan(ScanArgs),
    /// List the in-scope pages of sites without scanning them
    Discover(DiscoverArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = brandscan_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan(args)) => scan::run_scan(&config, &args).await?,
        Some(Commands::Discover(args)) => discover::run_discover(&config, &args).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
