//! Map-reduce scheduling: width, failure isolation, barrier, empty input

use super::common::*;
use std::time::Duration;

use review_insights::analysis::{progress_channel, run_map_reduce, ReviewCorpus, Sentiment};
use review_insights::config::AnalysisSettings;
use review_insights::llm::LlmError;

fn small_chunks(concurrency: usize) -> AnalysisSettings {
    AnalysisSettings {
        chunk_size: 10,
        concurrency,
        ..AnalysisSettings::default()
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_map_width_is_bounded() {
    let client = StubClient::new(happy_responder).with_delay(Duration::from_millis(20));
    let corpus = long_corpus(10, 4);

    let report = run_map_reduce(&client, &corpus, "Game", &small_chunks(3), None)
        .await
        .unwrap();

    assert!(report.is_some());
    let kinds = client.kinds();
    assert_eq!(kinds.iter().filter(|k| is_map(**k)).count(), 8);
    assert!(client.max_in_flight() <= 3, "max in flight {}", client.max_in_flight());
    assert!(client.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_chunk_cap_limits_map_calls() {
    let client = StubClient::new(happy_responder);
    // 10 slices of text per class, capped at 4
    let corpus = long_corpus(10, 10);

    run_map_reduce(&client, &corpus, "Game", &small_chunks(6), None)
        .await
        .unwrap();

    assert_eq!(client.requests_of(CallKind::MapPositive).len(), 4);
    assert_eq!(client.requests_of(CallKind::MapNegative).len(), 4);
}

// ============================================================================
// Barrier
// ============================================================================

#[tokio::test]
async fn test_reduce_starts_after_every_map() {
    let client = StubClient::new(happy_responder).with_delay(Duration::from_millis(5));
    let corpus = long_corpus(10, 3);

    run_map_reduce(&client, &corpus, "Game", &small_chunks(2), None)
        .await
        .unwrap();

    let kinds = client.kinds();
    let last_map = kinds.iter().rposition(|k| is_map(*k)).unwrap();
    let first_reduce = kinds.iter().position(|k| is_reduce(*k)).unwrap();
    assert!(last_map < first_reduce, "call order: {:?}", kinds);
    assert_eq!(kinds.iter().filter(|k| is_reduce(**k)).count(), 2);
}

#[tokio::test]
async fn test_reduce_sees_every_successful_summary() {
    let client = StubClient::new(|kind, request| match kind {
        CallKind::MapPositive => Ok(format!("- summary of {}", request.text().len())),
        other => happy_responder(other, request),
    });
    let corpus = long_corpus(10, 3);

    run_map_reduce(&client, &corpus, "Game", &small_chunks(3), None)
        .await
        .unwrap();

    let reduce = client.requests_of(CallKind::ReducePositive);
    assert_eq!(reduce.len(), 1);
    let user = &reduce[0].messages[1].content;
    assert_eq!(user.matches("- summary of").count(), 3);
    assert_eq!(user.matches("\n---\n").count(), 2);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_one_failed_map_does_not_sink_its_class() {
    let client = StubClient::new(|kind, request| {
        if kind == CallKind::MapPositive && request.text().contains("aaaaaaaaaa") {
            return Err(LlmError::Transport("connection reset".to_string()));
        }
        happy_responder(kind, request)
    });
    let corpus = ReviewCorpus::new(vec!["aaaaaaaaaabbbbbbbbbb".to_string()], Vec::new());

    let report = run_map_reduce(&client, &corpus, "Game", &small_chunks(2), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(client.requests_of(CallKind::MapPositive).len(), 2);
    let reduce = client.requests_of(CallKind::ReducePositive);
    assert_eq!(reduce[0].messages[1].content.matches("- stunning visuals").count(), 1);
    assert!(report.positive.is_some());
    assert!(report.negative.is_none());
}

#[tokio::test]
async fn test_class_with_only_failed_maps_is_absent() {
    let client = StubClient::new(|kind, request| match kind {
        CallKind::MapNegative => Err(LlmError::Status {
            status: 503,
            body: "overloaded".to_string(),
        }),
        other => happy_responder(other, request),
    });
    let corpus = long_corpus(10, 2);

    let report = run_map_reduce(&client, &corpus, "Game", &small_chunks(4), None)
        .await
        .unwrap()
        .unwrap();

    assert!(report.get(Sentiment::Positive).is_some());
    assert!(report.get(Sentiment::Negative).is_none());
    assert!(client.requests_of(CallKind::ReduceNegative).is_empty());
}

#[tokio::test]
async fn test_malformed_reduce_makes_class_absent() {
    let client = StubClient::new(|kind, request| match kind {
        CallKind::ReduceNegative => Ok("Players mostly complain about crashes.".to_string()),
        other => happy_responder(other, request),
    });

    let report = run_map_reduce(&client, &long_corpus(10, 1), "Game", &small_chunks(2), None)
        .await
        .unwrap()
        .unwrap();

    assert!(report.positive.is_some());
    assert!(report.negative.is_none());
}

#[tokio::test]
async fn test_total_failure_is_no_result() {
    let client = StubClient::new(|_, _| Err(LlmError::Empty));

    let report = run_map_reduce(&client, &long_corpus(10, 2), "Game", &small_chunks(2), None)
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(client.calls(), 4);
}

// ============================================================================
// Empty input
// ============================================================================

#[tokio::test]
async fn test_empty_corpus_makes_no_calls() {
    let client = StubClient::new(happy_responder);

    let report = run_map_reduce(&client, &ReviewCorpus::default(), "Game", &small_chunks(2), None)
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(client.calls(), 0);
}

// ============================================================================
// Progress
// ============================================================================

#[tokio::test]
async fn test_progress_runs_from_map_share_to_one() {
    let client = StubClient::new(happy_responder);
    let (tx, mut rx) = progress_channel();

    run_map_reduce(&client, &long_corpus(10, 2), "Game", &small_chunks(2), Some(tx))
        .await
        .unwrap();

    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }

    // 4 map updates, reduce start, 2 reduce updates, finish
    assert_eq!(updates.len(), 8);
    assert!(updates[..4].iter().all(|u| u.label.contains(" slice ")));
    assert!((updates[3].fraction - 0.9).abs() < 1e-5);
    assert_eq!(updates[4].label, "aggregating insights and entities");
    assert!(updates.windows(2).all(|w| w[0].fraction <= w[1].fraction));
    assert_eq!(updates.last().unwrap().fraction, 1.0);
    assert_eq!(updates.last().unwrap().label, "analysis complete");
}
