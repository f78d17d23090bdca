//! Chat command handling: recipient adoption and command parsing

use tracing::{debug, info, warn};

use crate::infrastructure::notify::CommandSource;
use crate::shared::errors::NotifyError;

pub const GREETING: &str = "👋 Hi! I will notify you about sharp liquidity changes and account health.\nCommands: /status, /health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Status,
    Health,
}

impl BotCommand {
    /// `/status` and `/status@SomeBot` are the same command; anything else is ignored
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.split('@').next().unwrap_or(first);
        match name {
            "/start" => Some(BotCommand::Start),
            "/status" => Some(BotCommand::Status),
            "/health" => Some(BotCommand::Health),
            _ => None,
        }
    }
}

/// Command addressed to the chat it came from
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommand {
    pub chat_id: String,
    pub command: BotCommand,
}

/// Tracks the alert recipient and the update cursor
#[derive(Debug, Default)]
pub struct BotCommandHandler {
    recipient: Option<String>,
    offset: Option<i64>,
}

impl BotCommandHandler {
    pub fn new(static_chat_id: Option<String>) -> Self {
        let recipient = static_chat_id.filter(|id| !id.is_empty());
        match &recipient {
            Some(id) => info!("✅ Alert recipient loaded from configuration: {}", id),
            None => warn!("⚠️ No chat id configured, alerts are held back until a /start"),
        }
        Self {
            recipient,
            offset: None,
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Fetch new updates, adopt the first sender as recipient when none is
    /// set, and return the recognised commands in arrival order. The cursor
    /// moves past every update, text or not.
    pub async fn poll(&mut self, source: &dyn CommandSource) -> Vec<PendingCommand> {
        let updates = match source.poll(self.offset).await {
            Ok(updates) => updates,
            Err(NotifyError::Conflict) => {
                debug!("getUpdates conflict, skipping poll");
                return Vec::new();
            }
            Err(e) => {
                warn!("❌ Command poll failed: {}", e);
                return Vec::new();
            }
        };

        let mut commands = Vec::new();
        for update in updates {
            let next = update.update_id + 1;
            if self.offset.map_or(true, |current| next > current) {
                self.offset = Some(next);
            }

            let Some(message) = update.message else {
                continue;
            };

            if self.recipient.is_none() {
                info!("💾 Chat id adopted from command: {}", message.chat_id);
                self.recipient = Some(message.chat_id.clone());
            }

            if let Some(command) = BotCommand::parse(&message.text) {
                commands.push(PendingCommand {
                    chat_id: message.chat_id,
                    command,
                });
            }
        }
        commands
    }
}
