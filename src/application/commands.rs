//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::application::services::MonitorService;
use crate::shared::errors::AppError;
use crate::shared::types::BotConfig;

#[derive(Parser, Debug)]
#[command(name = "lendwatch", version)]
#[command(about = "Lending position health and pool liquidity monitor")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true, default_value = "Config.toml")]
    pub config: PathBuf,

    /// JSON-RPC endpoint (overrides config and RPC_URL)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Liquidity change alert threshold in USD
    #[arg(long, global = true)]
    pub threshold_usd: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the monitor: periodic checks, alerts and chat commands
    Run,

    /// Print current pool liquidity once
    Status,

    /// Print the multi-protocol health report once
    Health {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the account's own safe/danger classification once
    #[command(name = "self-health")]
    SelfHealth,
}

impl Cli {
    /// Command-line values take priority over env and file
    pub fn apply_overrides(&self, config: &mut BotConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(threshold) = self.threshold_usd {
            config.monitor.threshold_usd = threshold;
        }
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: BotConfig) -> Result<(), AppError> {
        let service = MonitorService::from_config(&config)?;

        match command {
            Commands::Run => service.run().await,
            Commands::Status => {
                println!("{}", service.liquidity_report().await);
                Ok(())
            }
            Commands::Health { json } => {
                info!("🩺 Evaluating {} protocol(s)...", config.protocols.len());
                let report = service.health_report().await;
                if json {
                    let rendered = report
                        .to_json()
                        .map_err(|e| AppError::Unknown(format!("Failed to render report: {}", e)))?;
                    println!("{}", rendered);
                } else {
                    println!("{}", report.to_text());
                }
                Ok(())
            }
            Commands::SelfHealth => {
                println!("{}", service.self_health_report().await);
                Ok(())
            }
        }
    }
}
