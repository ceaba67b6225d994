use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::cancel::CancelToken;
use crate::dispatcher::Dispatcher;
use crate::formatter::Formatter;
use crate::sources::NewsSource;
use crate::types::{
    DispatchSummary, FormattedMessage, PipelineError, Result, RunSummary,
};

/// Owns one full run: aggregate, format, dispatch. All articles and
/// messages live only for the duration of the run.
pub struct NewsPipeline {
    sources: Vec<Box<dyn NewsSource>>,
    aggregator: Aggregator,
    formatter: Formatter,
    dispatcher: Dispatcher,
}

impl NewsPipeline {
    pub fn builder() -> NewsPipelineBuilder {
        NewsPipelineBuilder::new()
    }

    pub async fn run(&self, cancel: &CancelToken) -> RunSummary {
        info!("Starting news run with {} sources", self.sources.len());

        let articles = self.aggregator.collect(&self.sources, cancel).await;
        if articles.is_empty() {
            info!("No articles fetched, nothing to send");
            return RunSummary {
                fetched: 0,
                formatted: 0,
                dispatch: DispatchSummary::default(),
            };
        }
        let fetched = articles.len();

        let mut messages: Vec<FormattedMessage> = Vec::new();
        for article in &articles {
            match self.formatter.format(article) {
                Ok(message) => messages.push(message),
                Err(reason) => {
                    debug!("Skipping article {} ({}): {}", article.id, article.title, reason);
                }
            }
        }
        info!("Formatted {}/{} articles", messages.len(), fetched);

        let dispatch = self.dispatcher.run(&messages, cancel).await;
        RunSummary {
            fetched,
            formatted: messages.len(),
            dispatch,
        }
    }
}

/// Builder for wiring sources and collaborators into a pipeline.
pub struct NewsPipelineBuilder {
    sources: Vec<Box<dyn NewsSource>>,
    aggregator: Aggregator,
    formatter: Formatter,
    dispatcher: Option<Dispatcher>,
}

impl Default for NewsPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsPipelineBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            aggregator: Aggregator::default(),
            formatter: Formatter::default(),
            dispatcher: None,
        }
    }

    pub fn add_source(mut self, source: Box<dyn NewsSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> Result<NewsPipeline> {
        let dispatcher = self
            .dispatcher
            .ok_or_else(|| PipelineError::Config("pipeline requires a dispatcher".to_string()))?;
        Ok(NewsPipeline {
            sources: self.sources,
            aggregator: self.aggregator,
            formatter: self.formatter,
            dispatcher,
        })
    }
}
