//! Alert delivery and chat command transport

pub mod log_notifier;
pub mod telegram_client;

pub use log_notifier::LogNotifier;
pub use telegram_client::TelegramClient;

use async_trait::async_trait;

use crate::shared::errors::NotifyError;

/// Delivers alert text to a chat recipient
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError>;
}

/// Text message carried by an update
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub chat_id: String,
    pub text: String,
}

/// One incoming update; `message` is None for stickers, joins, edits and
/// other non-text updates, which still move the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct ChatUpdate {
    pub update_id: i64,
    pub message: Option<ChatMessage>,
}

impl ChatUpdate {
    pub fn text(update_id: i64, chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            update_id,
            message: Some(ChatMessage {
                chat_id: chat_id.into(),
                text: text.into(),
            }),
        }
    }

    pub fn other(update_id: i64) -> Self {
        Self {
            update_id,
            message: None,
        }
    }
}

/// Source of incoming chat commands
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Updates with id >= `offset`; passing an offset acknowledges
    /// everything before it
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<ChatUpdate>, NotifyError>;
}
