//! Discord channel — alert delivery via the Bot REST API.
//!
//! Sends one embed per alert to the configured channel and can edit a
//! previously sent message in place, which is how event results replace
//! the 1-minute warning.

use async_trait::async_trait;
use chrono::Utc;
use econwatch_core::config::DiscordConfig;
use econwatch_core::{AlertPayload, EconError, MessageSink, MessageRef, Result};
use serde::Deserialize;

const API_BASE: &str = "https://discord.com/api/v10";

/// Discord REST channel.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
}

/// The slice of Discord's message object we care about.
#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{API_BASE}/channels/{}/messages", self.config.channel_id)
    }

    fn embed_json(payload: &AlertPayload) -> serde_json::Value {
        serde_json::json!({
            "embeds": [{
                "title": payload.title,
                "description": payload.body,
                "color": payload.color,
            }]
        })
    }
}

#[async_trait]
impl MessageSink for DiscordChannel {
    async fn send_alert(&self, payload: &AlertPayload) -> Result<Option<MessageRef>> {
        if !self.config.enabled {
            tracing::debug!("Discord channel disabled, dropping alert '{}'", payload.title);
            return Ok(None);
        }

        let response = self
            .client
            .post(self.messages_url())
            .header("Authorization", format!("Bot {}", self.config.bot_token))
            .json(&Self::embed_json(payload))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| EconError::Channel(format!("Discord send failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EconError::Channel(format!(
                "Discord send returned {status}: {body}"
            )));
        }

        let message: DiscordMessage = response
            .json()
            .await
            .map_err(|e| EconError::Channel(format!("Invalid Discord response: {e}")))?;

        tracing::info!("Discord alert sent: {}", payload.title);
        Ok(Some(MessageRef {
            channel_id: self.config.channel_id.clone(),
            message_id: message.id,
            sent_at: Utc::now(),
        }))
    }

    async fn edit_alert(&self, handle: &MessageRef, payload: &AlertPayload) -> Result<()> {
        let url = format!(
            "{API_BASE}/channels/{}/messages/{}",
            handle.channel_id, handle.message_id
        );
        let response = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bot {}", self.config.bot_token))
            .json(&Self::embed_json(payload))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| EconError::Channel(format!("Discord edit failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EconError::Channel(format!(
                "Discord edit returned {status}: {body}"
            )));
        }

        tracing::info!("Discord alert edited in place: {}", payload.title);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_json_carries_payload_fields() {
        let payload = AlertPayload {
            title: "Events — 1-Minute Alert".into(),
            body: "• **CPI**".into(),
            color: 0xff8c00,
        };
        let json = DiscordChannel::embed_json(&payload);
        assert_eq!(json["embeds"][0]["title"], "Events — 1-Minute Alert");
        assert_eq!(json["embeds"][0]["color"], 0xff8c00);
    }

    #[tokio::test]
    async fn disabled_channel_returns_no_handle() {
        let channel = DiscordChannel::new(DiscordConfig {
            bot_token: "t".into(),
            channel_id: "1".into(),
            enabled: false,
        });
        let payload = AlertPayload {
            title: "x".into(),
            body: "y".into(),
            color: 0,
        };
        assert!(channel.send_alert(&payload).await.unwrap().is_none());
    }
}
