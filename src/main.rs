use anyhow::Result;
use clap::Parser;
use pazzle::app_log;
use pazzle::cli::{handle_command, PazzleCli};
use pazzle::core::ConfigManager;
use pazzle::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PazzleCli::parse();

    // Logging needs the config for its path, so config errors go to stderr
    let config = ConfigManager::load()?;
    logging::init(&config.logging.path, &config.logging.filter)?;

    app_log!(info, "Loaded configuration for environment: {}", config.environment);
    app_log!(info, "Log file: {}", config.logging.path.display());

    handle_command(cli, config).await
}
