mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "wbdash-cli")]
#[command(about = "Marketplace dashboard operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one refresh cycle against the live API and print summaries as JSON
    Refresh {
        /// Only print these product codes (comma-separated); default is the whole catalog
        #[arg(long, value_delimiter = ',')]
        codes: Vec<String>,
    },
    /// Print the product catalog
    Catalog,
    /// Load configuration and catalog, then print the redacted config
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = wbdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Refresh { codes } => commands::run_refresh(&config, &codes).await,
        Commands::Catalog => commands::run_catalog(&config),
        Commands::CheckConfig => commands::run_check_config(&config),
    }
}
