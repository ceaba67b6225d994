use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::dispatcher::MessageSink;
use crate::types::{PipelineError, Result};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Delivery sink backed by the Telegram Bot API.
pub struct TelegramSink {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token, timeout)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        let status = response.status();
        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|_| PipelineError::Send(format!("HTTP {status}")))?;
        if !parsed.ok {
            return Err(PipelineError::Send(
                parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }
        Ok(())
    }
}
