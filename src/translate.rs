use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::dispatcher::Translator;
use crate::types::{PipelineError, Result};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Translator backed by the public gtx translate endpoint.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
}

impl HttpTranslator {
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, timeout)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Translation(format!("HTTP {status}")));
        }

        let payload: Value = response.json().await?;
        let translated = collect_segments(&payload);
        if translated.trim().is_empty() {
            return Err(PipelineError::Translation("empty response".to_string()));
        }
        Ok(translated)
    }
}

/// The gtx payload is a nested array; segment texts live at [0][i][0].
fn collect_segments(payload: &Value) -> String {
    payload
        .get(0)
        .and_then(Value::as_array)
        .map(|segments| {
            segments
                .iter()
                .filter_map(|segment| segment.get(0).and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}
