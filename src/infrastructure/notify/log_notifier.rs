use async_trait::async_trait;
use tracing::info;

use super::{AlertSink, ChatUpdate, CommandSource};
use crate::shared::errors::NotifyError;

/// Writes alerts to the log; used when no bot token is configured
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl AlertSink for LogNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        info!("📣 [{}] {}", recipient, text);
        Ok(())
    }
}

/// Никаких входящих команд без транспорта
#[async_trait]
impl CommandSource for LogNotifier {
    async fn poll(&self, _offset: Option<i64>) -> Result<Vec<ChatUpdate>, NotifyError> {
        Ok(Vec::new())
    }
}
