use crate::config::DiscordConfig;
use crate::models::Report;
use crate::plugins::traits::NotifierPlugin;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const CHANNEL: &str = "discord";

/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    username: String,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig, timeout: Duration) -> Result<Self> {
        let webhook_url = config
            .webhook_url
            .clone()
            .ok_or_else(|| AppError::notify(CHANNEL, "Missing webhook_url"))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(DiscordNotifier {
            client,
            webhook_url,
            username: config.username.clone(),
        })
    }

    fn format_content(&self, report: &Report) -> String {
        let content = format!("**{}**\n{}", report.subject, report.body.trim_end());
        truncate_chars(&content, MAX_CONTENT_CHARS)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max - 1).collect();
    truncated.push('…');
    truncated
}

#[async_trait]
impl NotifierPlugin for DiscordNotifier {
    fn name(&self) -> &str {
        "Discord Notifier"
    }

    fn plugin_type(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, report: &Report) -> Result<()> {
        let payload = json!({
            "username": self.username,
            "content": self.format_content(report),
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notify(CHANNEL, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(
                CHANNEL,
                format!("webhook returned {}: {}", status, body),
            ));
        }

        Ok(())
    }
}
