use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::types::{PipelineError, Result};

/// Tunables for the REST-query source. Credentials and the watch-list are
/// injected by the caller; everything else carries a working default.
#[derive(Debug, Clone)]
pub struct RestSourceConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Full list of tracked subjects, queried in batches.
    pub watch_list: Vec<String>,
    /// Topical terms combined with every batch query.
    pub keywords: Vec<String>,
    /// Provider identifiers passed as the source allow-list, if any.
    pub source_allow_list: Vec<String>,
    pub language: String,
    pub page_size: u32,
    /// Subjects per query, clamped to 1..=10 at fetch time.
    pub batch_size: usize,
    /// Fixed pause between batch queries.
    pub batch_delay: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl RestSourceConfig {
    pub fn new(api_key: impl Into<String>, watch_list: Vec<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: "https://newsapi.org/v2/everything".to_string(),
            watch_list,
            keywords: ["stock", "shares", "earnings", "market"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source_allow_list: Vec::new(),
            language: "en".to_string(),
            page_size: 25,
            batch_size: 5,
            batch_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Tunables for the per-symbol ticker-news source.
#[derive(Debug, Clone)]
pub struct TickerSourceConfig {
    pub endpoint: String,
    pub source_name: String,
    pub symbols: Vec<String>,
    pub news_count: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl TickerSourceConfig {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            endpoint: "https://query1.finance.yahoo.com/v1/finance/search".to_string(),
            source_name: "Yahoo Finance".to_string(),
            symbols,
            news_count: 10,
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Delivery settings for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub chat_id: i64,
    pub target_lang: String,
    /// Fixed pause between successive sends.
    pub pacing: Duration,
}

impl DispatchConfig {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            target_lang: "ru".to_string(),
            pacing: Duration::from_secs(30),
        }
    }
}

/// Thresholds for the message formatter.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    pub min_sentences: usize,
    pub max_sentences: usize,
    /// Floor applied inside the sentence filter chain.
    pub min_sentence_len: usize,
    /// Final-cut floor; a sentence of this length is kept with or without
    /// terminal punctuation.
    pub keep_sentence_len: usize,
    pub min_body_len: usize,
    pub footer: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            min_sentences: 3,
            max_sentences: 15,
            min_sentence_len: 20,
            keep_sentence_len: 30,
            min_body_len: 50,
            footer: "#MarketNews".to_string(),
        }
    }
}

/// Telegram channel ids come in several user-facing spellings; the Bot API
/// wants the numeric `-100`-prefixed form.
pub fn normalize_chat_id(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PipelineError::Config("chat id is empty".to_string()));
    }
    if raw.starts_with('@') {
        return Err(PipelineError::Config(
            "channel usernames are not supported, use the numeric channel id".to_string(),
        ));
    }
    let normalized = if raw.starts_with("-100") {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix('-') {
        format!("-100{rest}")
    } else {
        format!("-100{raw}")
    };
    normalized
        .parse::<i64>()
        .map_err(|_| PipelineError::Config(format!("malformed chat id: {raw}")))
}
