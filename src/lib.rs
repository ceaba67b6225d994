pub mod aggregator;
pub mod cancel;
pub mod config;
pub mod dispatcher;
pub mod formatter;
pub mod pipeline;
pub mod retry;
pub mod sources;
pub mod telegram;
pub mod translate;
pub mod types;

pub use aggregator::Aggregator;
pub use cancel::CancelToken;
pub use dispatcher::{Dispatcher, MessageSink, Translator};
pub use formatter::{FormatError, Formatter};
pub use pipeline::{NewsPipeline, NewsPipelineBuilder};
pub use retry::{with_retry, FailureKind, RetryPolicy};
pub use sources::{NewsSource, RestQuerySource, TickerNewsSource};
pub use telegram::TelegramSink;
pub use translate::HttpTranslator;
pub use types::*;
