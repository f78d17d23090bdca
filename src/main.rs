use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lendwatch::application::{Cli, CommandExecutor};
use lendwatch::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    // Priority: CLI args > env > config file > defaults
    let mut config = ConfigLoader::load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);
    ConfigLoader::validate(&config)?;

    info!("⚙️ Config loaded from {}", cli.config.display());
    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
