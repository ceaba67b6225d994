#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use market_news::{
    Article, CancelToken, FormattedMessage, MessageSink, NewsSource, PipelineError, Translator,
};

/// Source that returns a fixed article list.
pub struct StaticSource {
    pub name: String,
    pub articles: Vec<Article>,
}

impl StaticSource {
    pub fn new(name: &str, articles: Vec<Article>) -> Self {
        Self {
            name: name.to_string(),
            articles,
        }
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self, _cancel: &CancelToken) -> market_news::Result<Vec<Article>> {
        Ok(self.articles.clone())
    }
}

/// Source that always fails.
pub struct FailingSource;

#[async_trait]
impl NewsSource for FailingSource {
    fn source_name(&self) -> String {
        "failing".to_string()
    }

    async fn fetch(&self, _cancel: &CancelToken) -> market_news::Result<Vec<Article>> {
        Err(PipelineError::Provider { status: 500 })
    }
}

/// Translator that tags the text with the target language, optionally
/// failing or returning an empty result for bodies containing a marker.
pub struct MockTranslator {
    fail_marker: Option<String>,
    empty_marker: Option<String>,
}

impl MockTranslator {
    pub fn reliable() -> Self {
        Self {
            fail_marker: None,
            empty_marker: None,
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            empty_marker: None,
        }
    }

    pub fn empty_on(marker: &str) -> Self {
        Self {
            fail_marker: None,
            empty_marker: Some(marker.to_string()),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> market_news::Result<String> {
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(PipelineError::Translation("mock failure".to_string()));
            }
        }
        if let Some(marker) = &self.empty_marker {
            if text.contains(marker.as_str()) {
                return Ok(String::new());
            }
        }
        Ok(format!("[{target_lang}] {text}"))
    }
}

/// Sink that records every message it is asked to send.
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(i64, String)>>>,
    fail_marker: Option<String>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<(i64, String)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: sent.clone(),
                fail_marker: None,
            },
            sent,
        )
    }

    pub fn failing_on(marker: &str) -> (Self, Arc<Mutex<Vec<(i64, String)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: sent.clone(),
                fail_marker: Some(marker.to_string()),
            },
            sent,
        )
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, chat_id: i64, text: &str) -> market_news::Result<()> {
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(PipelineError::Send("mock send failure".to_string()));
            }
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn dated(title: &str, description: &str, secs: i64) -> Article {
    Article::new("Test Wire", title)
        .with_description(Some(description.to_string()))
        .with_published_at(DateTime::<Utc>::from_timestamp(secs, 0))
}

pub fn undated(title: &str, description: &str) -> Article {
    Article::new("Test Wire", title).with_description(Some(description.to_string()))
}

/// An article whose description comfortably survives the formatter.
pub fn formattable(title: &str, secs: i64) -> Article {
    dated(
        title,
        "The index climbed for a third consecutive session on broad demand. \
         Heavy trading volume lifted the technology sector across the board. \
         Strategists expect gains to continue through the current quarter.",
        secs,
    )
}

pub fn message(body: &str) -> FormattedMessage {
    FormattedMessage {
        article_id: Uuid::new_v4(),
        body: body.to_string(),
    }
}
