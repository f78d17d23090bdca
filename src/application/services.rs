//! Application services and use cases

use std::sync::Arc;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use super::bot::{BotCommand, BotCommandHandler, GREETING};
use crate::domain::health::{HealthEvaluator, MultiProtocolReport, ProtocolHandle};
use crate::domain::liquidity::{liquidity_status, LiquidityChangeDetector, PoolCashSource, PoolDefinition};
use crate::domain::monitor::{AccountLiquiditySource, SelfHealthMonitor};
use crate::domain::position::{PositionReader, ProtocolDefinition};
use crate::domain::price::{PriceCache, UsdPriceResolver};
use crate::infrastructure::blockchain::{EvmRpcClient, ReaderFactory};
use crate::infrastructure::notify::{AlertSink, CommandSource, LogNotifier, TelegramClient};
use crate::infrastructure::price::CoinGeckoClient;
use crate::shared::errors::AppError;
use crate::shared::types::{parse_address, Address, BotConfig, MonitorSettings};

/// Collaborators the monitor works with
pub struct MonitorComponents {
    pub account: Address,
    pub pools: Vec<PoolDefinition>,
    pub pool_source: Arc<dyn PoolCashSource>,
    /// None when no self-health comptroller is configured
    pub liquidity_source: Option<Arc<dyn AccountLiquiditySource>>,
    pub protocols: Vec<ProtocolHandle>,
    pub evaluator: HealthEvaluator,
    pub prices: Arc<dyn UsdPriceResolver>,
    pub sink: Arc<dyn AlertSink>,
    pub commands: Arc<dyn CommandSource>,
    /// Connectivity probe target
    pub rpc: Option<Arc<EvmRpcClient>>,
}

impl MonitorComponents {
    /// Wire the real RPC, price feed and chat clients from configuration
    pub fn from_config(config: &BotConfig) -> Result<Self, AppError> {
        let timeout = Duration::from_millis(config.rpc.timeout_ms);
        let rpc = Arc::new(EvmRpcClient::new(config.rpc.url.clone(), timeout)?);
        let factory = ReaderFactory::new(rpc.clone())?;

        let account = parse_address(&config.account.address)?;

        let pools = config
            .pools
            .iter()
            .map(PoolDefinition::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        let mut protocols = Vec::with_capacity(config.protocols.len());
        for protocol in &config.protocols {
            protocols.push(ProtocolHandle {
                definition: ProtocolDefinition::from_config(protocol)?,
                reader: PositionReader::new(factory.create_reader(protocol)?),
            });
        }

        let liquidity_source: Option<Arc<dyn AccountLiquiditySource>> = match &config.self_health {
            Some(self_health) => {
                let reader: Arc<dyn AccountLiquiditySource> =
                    Arc::new(factory.liquidity_reader(&self_health.comptroller)?);
                Some(reader)
            }
            None => {
                info!("ℹ️ Self-health monitor disabled (no [self_health] section)");
                None
            }
        };

        let price_feed = CoinGeckoClient::new(config.prices.api_url.clone(), timeout)?;
        let prices = Arc::new(PriceCache::new(
            price_feed,
            Duration::from_secs(config.prices.cache_window_secs),
        ));

        let (sink, commands): (Arc<dyn AlertSink>, Arc<dyn CommandSource>) =
            match &config.telegram.bot_token {
                Some(token) => {
                    let client = Arc::new(TelegramClient::new(token, timeout)?);
                    let sink: Arc<dyn AlertSink> = client.clone();
                    let commands: Arc<dyn CommandSource> = client;
                    (sink, commands)
                }
                None => {
                    warn!("⚠️ No bot token configured, alerts go to the log only");
                    let notifier = Arc::new(LogNotifier);
                    let sink: Arc<dyn AlertSink> = notifier.clone();
                    let commands: Arc<dyn CommandSource> = notifier;
                    (sink, commands)
                }
            };

        Ok(Self {
            account,
            pools,
            pool_source: Arc::new(factory.pool_reader()),
            liquidity_source,
            protocols,
            evaluator: HealthEvaluator::new(config.prices.reference_asset.clone()),
            prices,
            sink,
            commands,
            rpc: Some(rpc),
        })
    }
}

/// Scheduler: liquidity + self-health checks, chat commands
pub struct MonitorService {
    settings: MonitorSettings,
    components: MonitorComponents,
    detector: LiquidityChangeDetector,
    self_health: SelfHealthMonitor,
    bot: BotCommandHandler,
}

impl MonitorService {
    pub fn new(settings: MonitorSettings, components: MonitorComponents, static_chat_id: Option<String>) -> Self {
        Self {
            detector: LiquidityChangeDetector::new(settings.threshold_usd),
            self_health: SelfHealthMonitor::new(),
            bot: BotCommandHandler::new(static_chat_id),
            settings,
            components,
        }
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, AppError> {
        let components = MonitorComponents::from_config(config)?;
        Ok(Self::new(
            config.monitor.clone(),
            components,
            config.telegram.chat_id.clone(),
        ))
    }

    /// Run until ctrl-c
    pub async fn run(mut self) -> Result<(), AppError> {
        info!("🚀 Starting lending monitor");
        info!("📊 Threshold: {} USD, check every {} ms", self.settings.threshold_usd, self.settings.check_interval_ms);

        sleep(Duration::from_millis(self.settings.startup_delay_ms)).await;
        self.probe().await;

        let mut check = interval(Duration::from_millis(self.settings.check_interval_ms));
        check.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut commands = interval(Duration::from_millis(self.settings.command_poll_interval_ms));
        commands.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = check.tick() => {
                    self.run_check_cycle().await;
                }
                _ = commands.tick() => {
                    self.handle_commands().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Shutdown requested");
                    break;
                }
            }
        }
        Ok(())
    }

    async fn probe(&self) {
        if let Some(rpc) = &self.components.rpc {
            match rpc.block_number().await {
                Ok(block) => info!("✅ Network reachable, current block: {}", block),
                Err(e) => error!("❌ Network connectivity check failed: {}", e),
            }
        }
    }

    /// One liquidity + self-health round; returns the alerts raised
    pub async fn run_check_cycle(&mut self) -> Vec<String> {
        let components = &self.components;
        let mut alerts: Vec<String> = self
            .detector
            .check_liquidity(components.pool_source.as_ref(), &components.pools)
            .await
            .iter()
            .map(|event| event.to_text())
            .collect();

        if let Some(source) = &components.liquidity_source {
            if let Some(transition) = self.self_health.check(source.as_ref(), &components.account).await {
                alerts.push(transition.to_text());
            }
        }

        for text in &alerts {
            self.alert(text).await;
        }
        alerts
    }

    async fn alert(&self, text: &str) {
        let Some(recipient) = self.bot.recipient() else {
            warn!("⚠️ No chat id, alert not sent: {}", text);
            return;
        };
        if let Err(e) = self.components.sink.send(recipient, text).await {
            error!("❌ Alert delivery failed: {}", e);
        }
    }

    /// Poll chat commands and answer each in its own chat
    pub async fn handle_commands(&mut self) {
        let pending = self.bot.poll(self.components.commands.as_ref()).await;
        for command in pending {
            let reply = self.respond(command.command).await;
            if let Err(e) = self.components.sink.send(&command.chat_id, &reply).await {
                error!("❌ Reply to {} failed: {}", command.chat_id, e);
            }
        }
    }

    async fn respond(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Start => GREETING.to_string(),
            BotCommand::Status => self.liquidity_report().await,
            BotCommand::Health => self.health_report().await.to_text(),
        }
    }

    pub async fn liquidity_report(&self) -> String {
        liquidity_status(self.components.pool_source.as_ref(), &self.components.pools).await
    }

    pub async fn health_report(&self) -> MultiProtocolReport {
        let c = &self.components;
        c.evaluator
            .evaluate_all(&c.account, &c.protocols, c.prices.as_ref())
            .await
    }

    /// Current classification, read once
    pub async fn self_health_report(&self) -> String {
        let c = &self.components;
        let Some(source) = &c.liquidity_source else {
            return "ℹ️ Self-health monitor disabled (no [self_health] section)".to_string();
        };

        match source.account_liquidity(&c.account).await {
            Ok(l) if l.error_code != 0 => {
                format!("⚠️ Account health unknown: error code {}", l.error_code)
            }
            Ok(l) => format!(
                "🩺 Account health: {} (free liquidity ${:.2}, shortfall ${:.2})",
                l.classify(),
                l.liquidity,
                l.shortfall
            ),
            Err(e) => format!("⚠️ Account health unknown: {}", e),
        }
    }
}
