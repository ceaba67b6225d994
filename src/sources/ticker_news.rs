use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::TickerSourceConfig;
use crate::retry::{with_retry, FailureKind};
use crate::sources::NewsSource;
use crate::types::{Article, PipelineError, Result};

#[derive(Debug, Deserialize)]
struct NewsLookupResponse {
    #[serde(default)]
    news: Vec<WireNewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNewsItem {
    title: Option<String>,
    summary: Option<String>,
    provider_publish_time: Option<i64>,
    link: Option<String>,
}

/// Per-symbol ticker-news source. Symbols are queried one at a time, in
/// order, and a symbol whose feed keeps failing is skipped rather than
/// failing the whole fetch.
pub struct TickerNewsSource {
    client: Client,
    config: TickerSourceConfig,
}

impl TickerNewsSource {
    pub fn new(config: TickerSourceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    async fn fetch_symbol(&self, symbol: &str) -> Result<Vec<Article>> {
        let news_count = self.config.news_count.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("q", symbol), ("newsCount", news_count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Provider {
                status: status.as_u16(),
            });
        }

        let parsed: NewsLookupResponse = response.json().await?;
        Ok(parsed
            .news
            .into_iter()
            .filter_map(|item| normalize(&self.config.source_name, item))
            .collect())
    }
}

/// The feed's summary doubles as both description and content.
fn normalize(source_name: &str, wire: WireNewsItem) -> Option<Article> {
    let summary = wire.summary;
    let published_at = wire
        .provider_publish_time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    let article = Article::new(source_name, wire.title?)
        .with_description(summary.clone())
        .with_content(summary)
        .with_published_at(published_at)
        .with_url(wire.link.filter(|u| url::Url::parse(u).is_ok()));
    article.is_valid().then_some(article)
}

#[async_trait]
impl NewsSource for TickerNewsSource {
    fn source_name(&self) -> String {
        self.config.source_name.clone()
    }

    async fn fetch(&self, cancel: &CancelToken) -> Result<Vec<Article>> {
        let mut collected = Vec::new();

        for symbol in &self.config.symbols {
            if cancel.is_cancelled() {
                info!("Fetch cancelled before symbol {}", symbol);
                break;
            }
            // Every feed fault is worth retrying; the budget is what bounds it.
            let outcome = with_retry(
                &self.config.retry,
                cancel,
                |_| FailureKind::Transient,
                || self.fetch_symbol(symbol),
            )
            .await;
            match outcome {
                Ok(mut articles) => {
                    debug!("Symbol {} produced {} articles", symbol, articles.len());
                    collected.append(&mut articles);
                }
                Err(PipelineError::Cancelled) => break,
                Err(e) => {
                    warn!("Giving up on news for {} after retries: {}", symbol, e);
                }
            }
        }

        info!(
            "Collected {} articles across {} symbols",
            collected.len(),
            self.config.symbols.len()
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uses_summary_for_both_fields() {
        let raw = r#"{
            "title": "Chipmaker guides above consensus",
            "summary": "The company raised its full-year outlook on data center demand.",
            "providerPublishTime": 1754300000,
            "link": "https://example.com/n"
        }"#;
        let wire: WireNewsItem = serde_json::from_str(raw).unwrap();
        let article = normalize("Yahoo Finance", wire).unwrap();
        assert_eq!(article.source_name, "Yahoo Finance");
        assert_eq!(article.description, article.content);
        assert!(article.published_at.is_some());
        assert_eq!(article.url.as_deref(), Some("https://example.com/n"));
    }

    #[test]
    fn test_normalize_drops_items_without_summary() {
        let raw = r#"{"title": "Headline only", "providerPublishTime": 1754300000}"#;
        let wire: WireNewsItem = serde_json::from_str(raw).unwrap();
        assert!(normalize("Yahoo Finance", wire).is_none());
    }

    #[test]
    fn test_normalize_missing_publish_time_sorts_last() {
        let raw = r#"{"title": "Headline", "summary": "A long enough summary for validity."}"#;
        let wire: WireNewsItem = serde_json::from_str(raw).unwrap();
        let article = normalize("Yahoo Finance", wire).unwrap();
        assert!(article.published_at.is_none());
    }
}
