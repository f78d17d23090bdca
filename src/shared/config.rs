use std::fs;
use std::path::Path;
use toml;
use tracing::info;
use crate::shared::types::{parse_address, BotConfig, ProtocolFamily};
use crate::shared::errors::AppError;

/// Загрузчик конфигурации
pub struct ConfigLoader;

impl ConfigLoader {
    /// Загрузить конфигурацию из TOML файла и применить переменные окружения
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::parse(&config_content)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<BotConfig, AppError> {
        toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Environment variables override values from the file
    pub fn apply_env_overrides<F>(config: &mut BotConfig, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RPC_URL") {
            config.rpc.url = url;
        }
        if let Some(token) = lookup("BOT_TOKEN") {
            config.telegram.bot_token = Some(token);
        }
        if let Some(chat_id) = lookup("STATIC_CHAT_ID") {
            let chat_id = chat_id.trim().to_string();
            if !chat_id.is_empty() {
                info!("✅ chat_id loaded from STATIC_CHAT_ID: {}", chat_id);
                config.telegram.chat_id = Some(chat_id);
            }
        }
        if let Some(threshold) = lookup("THRESHOLD_USD") {
            config.monitor.threshold_usd = threshold
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid THRESHOLD_USD: {}", e)))?;
        }
        if let Some(interval) = lookup("CHECK_INTERVAL_MS") {
            config.monitor.check_interval_ms = interval
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid CHECK_INTERVAL_MS: {}", e)))?;
        }
        Ok(())
    }

    /// Reject configurations the monitor cannot run with
    pub fn validate(config: &BotConfig) -> Result<(), AppError> {
        if config.rpc.url.trim().is_empty() {
            return Err(AppError::ConfigError("rpc.url is empty".to_string()));
        }
        if !(config.monitor.threshold_usd > 0.0) {
            return Err(AppError::ConfigError(format!(
                "monitor.threshold_usd must be positive, got {}",
                config.monitor.threshold_usd
            )));
        }
        if config.prices.cache_window_secs == 0 {
            return Err(AppError::ConfigError("prices.cache_window_secs must be positive".to_string()));
        }

        parse_address(&config.account.address)?;
        if let Some(self_health) = &config.self_health {
            parse_address(&self_health.comptroller)?;
        }
        for pool in &config.pools {
            parse_address(&pool.address)?;
        }

        for protocol in &config.protocols {
            match protocol.family {
                ProtocolFamily::Compound if protocol.comptroller.is_none() => {
                    return Err(AppError::ConfigError(format!(
                        "Protocol {} needs a comptroller address",
                        protocol.name
                    )));
                }
                _ => {}
            }
            if let Some(comptroller) = &protocol.comptroller {
                parse_address(comptroller)?;
            }
            if let Some(provider) = &protocol.data_provider {
                parse_address(provider)?;
            }
            for market in &protocol.markets {
                if market.contracts.is_empty() {
                    return Err(AppError::ConfigError(format!(
                        "Market {} of {} has no contracts",
                        market.symbol, protocol.name
                    )));
                }
                for contract in &market.contracts {
                    parse_address(contract)?;
                }
                if let Some(cf) = market.collateral_factor {
                    if !(0.0..=1.0).contains(&cf) {
                        return Err(AppError::ConfigError(format!(
                            "Collateral factor {} of {} outside [0, 1]",
                            cf, market.symbol
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
