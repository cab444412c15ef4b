//! Early-churn diagnosis

use super::common::*;
use std::sync::Arc;

use review_insights::analysis::{AnalysisCache, ChurnHealth};
use review_insights::llm::LlmError;

fn churn_table() -> Vec<review_insights::analysis::Review> {
    let mut reviews: Vec<_> = (0..97)
        .map(|i| review(&format!("solid game {}", i), true, 20.0))
        .collect();
    reviews.push(review("Crashes on launch, refunded", false, 0.3));
    reviews.push(review("Servers never connect", false, 1.5));
    reviews.push(review("Boring after 30 hours", false, 30.0));
    reviews
}

#[tokio::test]
async fn test_diagnosis_with_llm() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));

    let diagnosis = engine.refund(&churn_table(), "Game").await.unwrap();

    assert_eq!(diagnosis.refund_reviews, 2);
    assert_eq!(diagnosis.total_reviews, 100);
    assert!((diagnosis.churn_rate - 2.0).abs() < 1e-9);
    assert_eq!(diagnosis.health, ChurnHealth::Warning);
    assert_eq!(diagnosis.reasons.len(), 1);
    assert_eq!(diagnosis.reasons[0].category, "Crashes");

    let requests = client.requests_of(CallKind::Refund);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].messages[1].content,
        "Crashes on launch, refunded Servers never connect"
    );
    assert_eq!(requests[0].temperature, 0.3);
}

#[tokio::test]
async fn test_refund_text_is_truncated() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));
    let reviews = vec![review(&"崩".repeat(5000), false, 0.5)];

    engine.refund(&reviews, "Game").await.unwrap();

    let requests = client.requests_of(CallKind::Refund);
    assert_eq!(requests[0].messages[1].content.chars().count(), 4000);
}

#[tokio::test]
async fn test_no_refund_reviews_means_no_call() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));
    let reviews = vec![review("great", true, 0.5), review("meh", false, 80.0)];

    let diagnosis = engine.refund(&reviews, "Game").await.unwrap();

    assert_eq!(client.calls(), 0);
    assert!(diagnosis.reasons.is_empty());
    assert_eq!(diagnosis.health, ChurnHealth::Excellent);
}

#[tokio::test]
async fn test_bad_reasons_yield_empty_list() {
    let client = Arc::new(StubClient::new(|kind, request| match kind {
        CallKind::Refund => Ok(r#"{"reasons": "crashes"}"#.to_string()),
        other => happy_responder(other, request),
    }));
    let engine = llm_engine(client, Arc::new(AnalysisCache::new()));

    let diagnosis = engine.refund(&churn_table(), "Game").await.unwrap();

    assert_eq!(diagnosis.refund_reviews, 2);
    assert!(diagnosis.reasons.is_empty());
}

#[tokio::test]
async fn test_request_failure_yields_empty_list() {
    let client = Arc::new(StubClient::new(|_, _| Err(LlmError::Empty)));
    let engine = llm_engine(client, Arc::new(AnalysisCache::new()));

    let diagnosis = engine.refund(&churn_table(), "Game").await.unwrap();
    assert!(diagnosis.reasons.is_empty());
}
