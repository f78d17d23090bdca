//! Telegram Bot API client (sendMessage / getUpdates)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::{AlertSink, ChatMessage, ChatUpdate, CommandSource};
use crate::shared::errors::{AppError, NotifyError};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

pub struct TelegramClient {
    http_client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str, timeout: Duration) -> Result<Self, AppError> {
        Self::with_api_base(API_BASE, bot_token, timeout)
    }

    pub fn with_api_base(api_base: &str, bot_token: &str, timeout: Duration) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        })
    }
}

#[async_trait]
impl AlertSink for TelegramClient {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), NotifyError> {
        info!("📬 Sending to Telegram → {} | {}", recipient, text);

        let response = self
            .http_client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({ "chat_id": recipient, "text": text }))
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        check_status(response.status())
    }
}

#[async_trait]
impl CommandSource for TelegramClient {
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<ChatUpdate>, NotifyError> {
        let mut request = self.http_client.get(format!("{}/getUpdates", self.base_url));
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        check_status(response.status())?;

        let body: UpdatesResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        into_updates(body)
    }
}

fn check_status(status: StatusCode) -> Result<(), NotifyError> {
    if status == StatusCode::CONFLICT {
        // другой getUpdates уже активен
        return Err(NotifyError::Conflict);
    }
    if !status.is_success() {
        return Err(NotifyError::Http(format!("status {}", status)));
    }
    Ok(())
}

/// Every update is kept so the cursor can move past it; only text
/// messages carry a payload (trimmed)
fn into_updates(body: UpdatesResponse) -> Result<Vec<ChatUpdate>, NotifyError> {
    if !body.ok {
        return Err(NotifyError::Http(
            body.description.unwrap_or_else(|| "getUpdates not ok".to_string()),
        ));
    }

    Ok(body
        .result
        .into_iter()
        .map(|update| ChatUpdate {
            update_id: update.update_id,
            message: update.message.and_then(|message| {
                let text = message.text?.trim().to_string();
                Some(ChatMessage {
                    chat_id: message.chat.id.to_string(),
                    text,
                })
            }),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_updates_keeps_non_text_ids() {
        let body: UpdatesResponse = serde_json::from_str(
            r#"{"ok":true,"result":[
                {"update_id":10,"message":{"chat":{"id":42},"text":" /status "}},
                {"update_id":11,"message":{"chat":{"id":42}}},
                {"update_id":12}
            ]}"#,
        )
        .unwrap();

        let updates = into_updates(body).unwrap();
        assert_eq!(
            updates,
            vec![
                ChatUpdate::text(10, "42", "/status"),
                ChatUpdate::other(11),
                ChatUpdate::other(12),
            ]
        );
    }

    #[test]
    fn test_into_updates_only_non_text() {
        let body: UpdatesResponse = serde_json::from_str(
            r#"{"ok":true,"result":[
                {"update_id":50,"message":{"chat":{"id":42}}},
                {"update_id":51,"edited_message":{"chat":{"id":42},"text":"/status"}}
            ]}"#,
        )
        .unwrap();

        let updates = into_updates(body).unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.message.is_none()));
        assert_eq!(updates[1].update_id, 51);
    }

    #[test]
    fn test_into_updates_not_ok() {
        let body: UpdatesResponse =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
        assert!(matches!(into_updates(body), Err(NotifyError::Http(d)) if d == "Unauthorized"));
    }

    #[test]
    fn test_conflict_status() {
        assert!(matches!(check_status(StatusCode::CONFLICT), Err(NotifyError::Conflict)));
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(check_status(StatusCode::BAD_GATEWAY), Err(NotifyError::Http(_))));
    }
}
