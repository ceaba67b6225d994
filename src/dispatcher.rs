use async_trait::async_trait;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::config::DispatchConfig;
use crate::types::{DispatchResult, DispatchStatus, DispatchSummary, FormattedMessage, Result};

/// External translation collaborator. Treated as unreliable: failures and
/// empty results are expected and skip the affected message only.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

/// External delivery sink.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Delivers formatted messages in order, pacing between sends so the sink's
/// own rate limits are respected.
pub struct Dispatcher {
    translator: Box<dyn Translator>,
    sink: Box<dyn MessageSink>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        translator: Box<dyn Translator>,
        sink: Box<dyn MessageSink>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            translator,
            sink,
            config,
        }
    }

    /// Process every message sequentially. Single-message failures are
    /// recorded and never abort the run; the summary is always returned.
    pub async fn run(
        &self,
        messages: &[FormattedMessage],
        cancel: &CancelToken,
    ) -> DispatchSummary {
        let total = messages.len();
        let mut results = Vec::with_capacity(total);
        let mut sent_count = 0usize;

        for (i, message) in messages.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Dispatch cancelled, skipping remaining {} messages", total - i);
                results.extend(
                    messages[i..]
                        .iter()
                        .map(|m| DispatchResult::skipped(m.article_id, "cancelled")),
                );
                break;
            }

            let result = self.deliver(message).await;
            if result.status == DispatchStatus::Sent {
                sent_count += 1;
            }
            results.push(result);

            if i + 1 < total && !cancel.is_cancelled() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        info!("Dispatched {}/{} messages", sent_count, total);
        DispatchSummary {
            sent_count,
            total,
            results,
        }
    }

    async fn deliver(&self, message: &FormattedMessage) -> DispatchResult {
        let translated = match self
            .translator
            .translate(&message.body, &self.config.target_lang)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Empty translation for article {}", message.article_id);
                return DispatchResult::failed(message.article_id, "translation_failed");
            }
            Err(e) => {
                warn!("Translation failed for article {}: {}", message.article_id, e);
                return DispatchResult::failed(message.article_id, "translation_failed");
            }
        };

        match self.sink.send(self.config.chat_id, &translated).await {
            Ok(()) => DispatchResult::sent(message.article_id),
            Err(e) => {
                warn!("Send failed for article {}: {}", message.article_id, e);
                DispatchResult::failed(message.article_id, e.to_string())
            }
        }
    }
}
