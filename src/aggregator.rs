use futures::future::join_all;
use std::cmp::Ordering;
use tracing::{error, info};

use crate::cancel::CancelToken;
use crate::sources::NewsSource;
use crate::types::Article;

/// Merges the output of every registered source into one bounded,
/// time-ordered working set.
pub struct Aggregator {
    max_articles: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Aggregator {
    pub fn new(max_articles: usize) -> Self {
        Self { max_articles }
    }

    /// Fetch all sources in parallel and merge once every one has finished.
    /// A failing source is logged and isolated; it cannot abort the others
    /// or corrupt their results.
    pub async fn collect(
        &self,
        sources: &[Box<dyn NewsSource>],
        cancel: &CancelToken,
    ) -> Vec<Article> {
        let fetches = sources
            .iter()
            .map(|source| async move { (source.source_name(), source.fetch(cancel).await) });

        let mut merged: Vec<Article> = Vec::new();
        for (name, outcome) in join_all(fetches).await {
            match outcome {
                Ok(articles) => {
                    info!("Source {} produced {} articles", name, articles.len());
                    merged.extend(articles.into_iter().filter(|a| a.is_valid()));
                }
                Err(e) => error!("Source {} failed: {}", name, e),
            }
        }

        merged.sort_by(compare_publish_desc);
        merged.truncate(self.max_articles);
        merged
    }
}

/// Newest first; articles without a timestamp sort after all dated ones.
/// The sort is stable, so same-time entries keep their merge order.
fn compare_publish_desc(a: &Article, b: &Article) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
