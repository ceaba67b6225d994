mod common;

use common::{message, MockTranslator, RecordingSink};
use market_news::config::DispatchConfig;
use market_news::{CancelToken, DispatchStatus, Dispatcher};
use std::time::Duration;

fn fast_config(chat_id: i64) -> DispatchConfig {
    let mut config = DispatchConfig::new(chat_id);
    config.pacing = Duration::from_millis(1);
    config
}

#[tokio::test]
async fn test_all_messages_sent_in_order() {
    let (sink, sent) = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::reliable()),
        Box::new(sink),
        fast_config(77),
    );
    let messages = vec![message("first body"), message("second body")];

    let summary = dispatcher.run(&messages, &CancelToken::new()).await;

    assert_eq!(summary.sent_count, 2);
    assert_eq!(summary.total, 2);
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], (77, "[ru] first body".to_string()));
    assert_eq!(sent[1], (77, "[ru] second body".to_string()));
}

#[tokio::test]
async fn test_translation_failure_does_not_block_the_next_message() {
    let (sink, sent) = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::failing_on("BROKEN")),
        Box::new(sink),
        fast_config(77),
    );
    let messages = vec![
        message("alpha body"),
        message("BROKEN body"),
        message("gamma body"),
    ];

    let summary = dispatcher.run(&messages, &CancelToken::new()).await;

    assert_eq!(summary.sent_count, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.results[1].status, DispatchStatus::Failed);
    assert_eq!(
        summary.results[1].reason.as_deref(),
        Some("translation_failed")
    );
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.contains("alpha"));
    assert!(sent[1].1.contains("gamma"));
}

#[tokio::test]
async fn test_empty_translation_is_a_failure() {
    let (sink, sent) = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::empty_on("hollow")),
        Box::new(sink),
        fast_config(77),
    );
    let messages = vec![message("hollow body"), message("solid body")];

    let summary = dispatcher.run(&messages, &CancelToken::new()).await;

    assert_eq!(summary.sent_count, 1);
    assert_eq!(summary.results[0].status, DispatchStatus::Failed);
    assert_eq!(
        summary.results[0].reason.as_deref(),
        Some("translation_failed")
    );
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_send_failure_is_recorded_and_run_continues() {
    let (sink, sent) = RecordingSink::failing_on("poison");
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::reliable()),
        Box::new(sink),
        fast_config(77),
    );
    let messages = vec![message("poison body"), message("healthy body")];

    let summary = dispatcher.run(&messages, &CancelToken::new()).await;

    assert_eq!(summary.sent_count, 1);
    assert_eq!(summary.results[0].status, DispatchStatus::Failed);
    assert!(summary.results[0]
        .reason
        .as_deref()
        .unwrap()
        .contains("mock send failure"));
    assert_eq!(summary.results[1].status, DispatchStatus::Sent);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancelled_run_skips_everything() {
    let (sink, sent) = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::reliable()),
        Box::new(sink),
        fast_config(77),
    );
    let messages = vec![message("first body"), message("second body")];
    let cancel = CancelToken::new();
    cancel.cancel();

    let summary = dispatcher.run(&messages, &cancel).await;

    assert_eq!(summary.sent_count, 0);
    assert_eq!(summary.total, 2);
    assert!(summary
        .results
        .iter()
        .all(|r| r.status == DispatchStatus::Skipped));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_message_list_yields_empty_summary() {
    let (sink, sent) = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        Box::new(MockTranslator::reliable()),
        Box::new(sink),
        fast_config(77),
    );

    let summary = dispatcher.run(&[], &CancelToken::new()).await;

    assert_eq!(summary.sent_count, 0);
    assert_eq!(summary.total, 0);
    assert!(summary.results.is_empty());
    assert!(sent.lock().unwrap().is_empty());
}
