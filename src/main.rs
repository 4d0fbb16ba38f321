use clap::Parser;

mod classify;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;

use cli::Cli;
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    if let Err(e) = cli::run(cli, &config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
