//! Command-line browser for the RSI ship catalog.

mod browse;
mod cli;
mod commands;
mod error;
mod export;
mod view;

use std::process::ExitCode;

use clap::Parser;
use rsi::{CatalogService, Config};

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level())),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    let config = args.config();
    init_tracing(&config);
    tracing::debug!(cache = %config.cache_directory.display(), "starting");

    let catalog = match CatalogService::new(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&catalog, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
