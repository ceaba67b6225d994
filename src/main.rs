use anyhow::Context;
use std::env;
use std::time::Duration;
use tracing::info;

use market_news::config::{normalize_chat_id, DispatchConfig, RestSourceConfig, TickerSourceConfig};
use market_news::dispatcher::Dispatcher;
use market_news::pipeline::NewsPipeline;
use market_news::sources::{RestQuerySource, TickerNewsSource};
use market_news::telegram::TelegramSink;
use market_news::translate::HttpTranslator;
use market_news::CancelToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let telegram_token = env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN is not set")?;
    let raw_chat_id = env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID is not set")?;
    let newsapi_key = env::var("NEWSAPI_KEY").context("NEWSAPI_KEY is not set")?;
    let chat_id = normalize_chat_id(&raw_chat_id)?;

    let watch_list = vec![
        "NASDAQ".to_string(),
        "S&P 500".to_string(),
        "Dow Jones".to_string(),
    ];
    let symbols = vec![
        "AAPL".to_string(),
        "MSFT".to_string(),
        "NVDA".to_string(),
        "AMZN".to_string(),
        "GOOGL".to_string(),
    ];

    let dispatcher = Dispatcher::new(
        Box::new(HttpTranslator::new(Duration::from_secs(10))),
        Box::new(TelegramSink::new(telegram_token, Duration::from_secs(10))),
        DispatchConfig::new(chat_id),
    );

    let pipeline = NewsPipeline::builder()
        .add_source(Box::new(RestQuerySource::new(RestSourceConfig::new(
            newsapi_key,
            watch_list,
        ))))
        .add_source(Box::new(TickerNewsSource::new(TickerSourceConfig::new(
            symbols,
        ))))
        .dispatcher(dispatcher)
        .build()?;

    let cancel = CancelToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, finishing current work");
            interrupt.cancel();
        }
    });

    let summary = pipeline.run(&cancel).await;
    info!(
        "Run complete: fetched {}, formatted {}, sent {}/{}",
        summary.fetched, summary.formatted, summary.dispatch.sent_count, summary.dispatch.total
    );
    Ok(())
}
