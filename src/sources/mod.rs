mod rest_query;
mod ticker_news;

pub use rest_query::RestQuerySource;
pub use ticker_news::TickerNewsSource;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::types::{Article, Result};

/// A single external news provider.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Human-readable name for this source, used in logs.
    fn source_name(&self) -> String;

    /// Fetch and normalize articles from the provider.
    ///
    /// Implementations fail softly: transient provider faults are retried
    /// with backoff and then abandoned per batch or per symbol, so a
    /// partial (possibly empty) list is a normal outcome.
    async fn fetch(&self, cancel: &CancelToken) -> Result<Vec<Article>>;
}
