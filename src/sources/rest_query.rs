use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::RestSourceConfig;
use crate::retry::{with_retry, FailureKind};
use crate::sources::NewsSource;
use crate::types::{Article, PipelineError, Result};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArticle {
    #[serde(default)]
    source: WireSource,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    published_at: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireSource {
    name: Option<String>,
}

/// Polling REST source that queries a keyword/source-filter news endpoint
/// over the watch-list in batches.
pub struct RestQuerySource {
    client: Client,
    config: RestSourceConfig,
}

impl RestQuerySource {
    pub fn new(config: RestSourceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    /// One query string per batch: quoted subjects OR-joined, AND-combined
    /// with the topical keywords.
    fn build_query(&self, batch: &[String]) -> String {
        let subjects = batch
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        if self.config.keywords.is_empty() {
            format!("({subjects})")
        } else {
            format!("({subjects}) AND ({})", self.config.keywords.join(" OR "))
        }
    }

    async fn fetch_batch(&self, batch: &[String]) -> Result<Vec<Article>> {
        let query = self.build_query(batch);
        let page_size = self.config.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.as_str()),
            ("sortBy", "publishedAt"),
            ("language", self.config.language.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", self.config.api_key.as_str()),
        ];
        let allow_list = self.config.source_allow_list.join(",");
        if !allow_list.is_empty() {
            params.push(("sources", allow_list.as_str()));
        }

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(PipelineError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(PipelineError::Provider {
                status: status.as_u16(),
            });
        }

        let parsed: QueryResponse = response.json().await?;
        Ok(parsed
            .articles
            .into_iter()
            .filter_map(normalize)
            .collect())
    }
}

fn normalize(wire: WireArticle) -> Option<Article> {
    let article = Article::new(
        wire.source.name.unwrap_or_else(|| "Unknown".to_string()),
        wire.title?,
    )
    .with_description(wire.description)
    .with_content(wire.content)
    .with_published_at(wire.published_at.as_deref().and_then(parse_timestamp))
    .with_url(wire.url.filter(|u| is_link(u)))
    .with_image_url(wire.url_to_image.filter(|u| is_link(u)));
    article.is_valid().then_some(article)
}

/// Enrichment links must be well-formed; a broken one is dropped, not the
/// article.
fn is_link(raw: &str) -> bool {
    url::Url::parse(raw).is_ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Backpressure gets the advertised wait, 5xx and network faults are
/// transient, anything else is not worth retrying.
fn classify_fetch_error(err: &PipelineError) -> FailureKind {
    match err {
        PipelineError::RateLimited { retry_after } => {
            FailureKind::RateLimited(retry_after.map(Duration::from_secs))
        }
        PipelineError::Http(_) => FailureKind::Transient,
        PipelineError::Provider { status } if *status >= 500 => FailureKind::Transient,
        _ => FailureKind::Fatal,
    }
}

#[async_trait]
impl NewsSource for RestQuerySource {
    fn source_name(&self) -> String {
        "REST query".to_string()
    }

    async fn fetch(&self, cancel: &CancelToken) -> Result<Vec<Article>> {
        let batch_size = self.config.batch_size.clamp(1, 10);
        let total_batches = self.config.watch_list.len().div_ceil(batch_size);
        let mut collected = Vec::new();

        for (i, batch) in self.config.watch_list.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                info!("Fetch cancelled after {} of {} batches", i, total_batches);
                break;
            }
            let outcome = with_retry(&self.config.retry, cancel, classify_fetch_error, || {
                self.fetch_batch(batch)
            })
            .await;
            match outcome {
                Ok(mut articles) => {
                    debug!(
                        "Batch {}/{} returned {} usable articles",
                        i + 1,
                        total_batches,
                        articles.len()
                    );
                    collected.append(&mut articles);
                }
                Err(PipelineError::Cancelled) => break,
                Err(e) => {
                    warn!("Abandoning batch {}/{} after retries: {}", i + 1, total_batches, e);
                }
            }
            if i + 1 < total_batches && !cancel.is_cancelled() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        info!(
            "Collected {} articles from {} batches",
            collected.len(),
            total_batches
        );
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_quotes_and_joins() {
        let mut config = RestSourceConfig::new("key", vec!["NASDAQ".to_string(), "S&P 500".to_string()]);
        config.keywords = vec!["stock".to_string(), "earnings".to_string()];
        let source = RestQuerySource::new(config);
        assert_eq!(
            source.build_query(&["NASDAQ".to_string(), "S&P 500".to_string()]),
            "(\"NASDAQ\" OR \"S&P 500\") AND (stock OR earnings)"
        );
    }

    #[test]
    fn test_build_query_without_keywords() {
        let mut config = RestSourceConfig::new("key", vec!["NASDAQ".to_string()]);
        config.keywords.clear();
        let source = RestQuerySource::new(config);
        assert_eq!(source.build_query(&["NASDAQ".to_string()]), "(\"NASDAQ\")");
    }

    #[test]
    fn test_normalize_maps_provider_fields() {
        let raw = r#"{
            "source": {"name": "Reuters"},
            "title": "Markets rally",
            "description": "Stocks closed higher across the board.",
            "content": "Full text [+2000 chars]",
            "publishedAt": "2026-08-05T14:30:00Z",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg"
        }"#;
        let wire: WireArticle = serde_json::from_str(raw).unwrap();
        let article = normalize(wire).unwrap();
        assert_eq!(article.source_name, "Reuters");
        assert_eq!(article.title, "Markets rally");
        assert!(article.published_at.is_some());
        assert_eq!(article.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_normalize_drops_empty_articles() {
        let raw = r#"{"source": {"name": "Reuters"}, "title": "Markets rally"}"#;
        let wire: WireArticle = serde_json::from_str(raw).unwrap();
        assert!(normalize(wire).is_none());

        let raw = r#"{"source": {}, "description": "No title at all."}"#;
        let wire: WireArticle = serde_json::from_str(raw).unwrap();
        assert!(normalize(wire).is_none());
    }

    #[test]
    fn test_normalize_tolerates_bad_timestamp() {
        let raw = r#"{
            "source": {"name": "Reuters"},
            "title": "Markets rally",
            "description": "Stocks closed higher across the board.",
            "publishedAt": "yesterday-ish"
        }"#;
        let wire: WireArticle = serde_json::from_str(raw).unwrap();
        let article = normalize(wire).unwrap();
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_classify_fetch_errors() {
        assert_eq!(
            classify_fetch_error(&PipelineError::RateLimited { retry_after: Some(7) }),
            FailureKind::RateLimited(Some(Duration::from_secs(7)))
        );
        assert_eq!(
            classify_fetch_error(&PipelineError::Provider { status: 503 }),
            FailureKind::Transient
        );
        assert_eq!(
            classify_fetch_error(&PipelineError::Provider { status: 401 }),
            FailureKind::Fatal
        );
    }
}
