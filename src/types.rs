use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized record of one piece of news from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub source_name: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl Article {
    pub fn new(source_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_name: source_name.into(),
            title: title.into(),
            description: None,
            content: None,
            published_at: None,
            url: None,
            image_url: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// A usable article has a non-empty title and at least one of
    /// description or content non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        if self.title.trim().is_empty() {
            return false;
        }
        let has_description = self
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        let has_content = self.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        has_description || has_content
    }
}

/// A message body ready for translation and delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedMessage {
    pub article_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStatus {
    Sent,
    Skipped,
    Failed,
}

/// Per-article delivery outcome. Lives for one run only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub article_id: Uuid,
    pub status: DispatchStatus,
    pub reason: Option<String>,
}

impl DispatchResult {
    pub fn sent(article_id: Uuid) -> Self {
        Self {
            article_id,
            status: DispatchStatus::Sent,
            reason: None,
        }
    }

    pub fn skipped(article_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            article_id,
            status: DispatchStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(article_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            article_id,
            status: DispatchStatus::Failed,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent_count: usize,
    pub total: usize,
    pub results: Vec<DispatchResult>,
}

/// Best-effort accounting for one full pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    pub fetched: usize,
    pub formatted: usize,
    pub dispatch: DispatchSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("provider error: HTTP {status}")]
    Provider { status: u16 },

    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<u64> },

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("send rejected: {0}")]
    Send(String),

    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
