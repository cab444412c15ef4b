//! Retrieval Q&A

use super::common::*;
use std::sync::Arc;

use review_insights::analysis::qa::{answer_query, no_match_message};
use review_insights::analysis::{AnalysisCache, InsightEngine, KeywordTable};
use review_insights::config::AnalysisSettings;
use review_insights::llm::LlmError;

#[tokio::test]
async fn test_no_match_returns_canned_message_without_call() {
    let client = StubClient::new(happy_responder);
    let reviews = two_chunk_reviews();

    let answer = answer_query(&client, &reviews, "Game", "multiplayer", &AnalysisSettings::default()).await;

    assert_eq!(answer, no_match_message("multiplayer"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_context_is_limited_but_count_is_total() {
    let client = StubClient::new(happy_responder);
    let reviews: Vec<_> = (0..50)
        .map(|i| review(&format!("review {} mentions LOADING screens", i), i % 2 == 0, 3.0))
        .chain(std::iter::once(review("unrelated", true, 1.0)))
        .collect();

    let answer = answer_query(&client, &reviews, "Starfield", "loading", &AnalysisSettings::default()).await;

    assert_eq!(answer, "1. State\n2. Details\n3. Suggestions");
    let requests = client.requests_of(CallKind::Ask);
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert!(request.messages[0].content.contains("50 related reviews"));
    assert_eq!(request.temperature, 0.4);

    let context = &request.messages[1].content;
    assert!(context.contains("review 0 mentions"));
    assert!(context.contains("review 39 mentions"));
    assert!(!context.contains("review 40 mentions"));
    assert_eq!(context.lines().count(), 41); // "Context:" plus 40 reviews
}

#[tokio::test]
async fn test_failure_comes_back_inline() {
    let client = StubClient::new(|_, _| {
        Err(LlmError::Status {
            status: 401,
            body: "invalid key".to_string(),
        })
    });
    let reviews = two_chunk_reviews();

    let answer = answer_query(&client, &reviews, "Game", "crash", &AnalysisSettings::default()).await;

    assert!(answer.starts_with("Analysis failed"));
    assert!(answer.contains("401"));
}

#[tokio::test]
async fn test_engine_ask_uses_client() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));

    let answer = engine.ask(&two_chunk_reviews(), "Game", "boss").await.unwrap();

    assert!(answer.contains("Suggestions"));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_engine_ask_requires_credential() {
    let engine = InsightEngine::new(
        None,
        AnalysisSettings::default(),
        KeywordTable::default(),
        Arc::new(AnalysisCache::new()),
    );
    assert!(engine.ask(&two_chunk_reviews(), "Game", "boss").await.is_err());
}
