//! Insight engine: end-to-end scenario, caching and degradation

use super::common::*;
use std::sync::Arc;

use review_insights::analysis::{AnalysisCache, EngineKind, InsightEngine, KeywordTable};
use review_insights::config::AnalysisSettings;
use review_insights::llm::LlmError;

#[tokio::test]
async fn test_two_chunk_scenario_end_to_end() {
    let client = Arc::new(StubClient::new(happy_responder));
    let cache = Arc::new(AnalysisCache::new());
    let engine = llm_engine(client.clone(), cache.clone());

    let outcome = engine
        .analyze(&two_chunk_reviews(), "Elden Ring", None)
        .await
        .unwrap();

    assert_eq!(outcome.engine, EngineKind::MapReduce);
    assert_eq!(client.calls(), 4);

    let positive = &outcome.positive;
    assert_eq!(positive.insights[0].category, "Visuals");
    assert!(positive.insights[0].is_dominant);
    assert!(!positive.insights[1].is_dominant);
    assert_eq!(positive.entities, vec!["Boss X"]);

    let negative = &outcome.negative;
    assert_eq!(negative.insights.len(), 1);
    assert_eq!(negative.insights[0].category, "Stability");
    assert!(negative.insights[0].is_dominant);
    assert!(negative.entities.is_empty());

    // map output reached the reduce prompt
    let reduce = client.requests_of(CallKind::ReducePositive);
    assert!(reduce[0].messages[1].content.contains("Boss X fight"));
    assert!(reduce[0].messages[0].content.contains("Elden Ring"));

    assert!(!cache.needs_analysis("Elden Ring").await);
}

#[tokio::test]
async fn test_close_scores_are_not_dominant() {
    let client = Arc::new(StubClient::new(|kind, request| match kind {
        CallKind::ReducePositive => Ok(
            r#"{"insights":[{"category":"A","desc":"a","score":70},{"category":"B","desc":"b","score":65}],"entities":[]}"#
                .to_string(),
        ),
        other => happy_responder(other, request),
    }));
    let engine = llm_engine(client, Arc::new(AnalysisCache::new()));

    let outcome = engine.analyze(&two_chunk_reviews(), "Game", None).await.unwrap();
    assert!(outcome.positive.insights.iter().all(|i| !i.is_dominant));
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_repeat_analysis_served_from_cache() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));
    let reviews = two_chunk_reviews();

    let first = engine.analyze(&reviews, "Hades", None).await.unwrap();
    let second = engine.analyze(&reviews, "Hades", None).await.unwrap();

    assert_eq!(client.calls(), 4);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_product_switch_reanalyzes() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));
    let reviews = two_chunk_reviews();

    engine.analyze(&reviews, "Hades", None).await.unwrap();
    engine.analyze(&reviews, "Celeste", None).await.unwrap();
    assert_eq!(client.calls(), 8);

    // Hades is cached but no longer the last analyzed product
    engine.analyze(&reviews, "Hades", None).await.unwrap();
    assert_eq!(client.calls(), 12);
}

#[tokio::test]
async fn test_cache_is_shared_between_engines() {
    let cache = Arc::new(AnalysisCache::new());
    let first = Arc::new(StubClient::new(happy_responder));
    let second = Arc::new(StubClient::new(happy_responder));

    llm_engine(first.clone(), cache.clone())
        .analyze(&two_chunk_reviews(), "Hades", None)
        .await
        .unwrap();
    llm_engine(second.clone(), cache)
        .analyze(&two_chunk_reviews(), "Hades", None)
        .await
        .unwrap();

    assert_eq!(first.calls(), 4);
    assert_eq!(second.calls(), 0);
}

// ============================================================================
// Degradation
// ============================================================================

#[tokio::test]
async fn test_total_llm_failure_degrades_to_keywords_uncached() {
    let client = Arc::new(StubClient::new(|_, _| {
        Err(LlmError::Transport("timed out".to_string()))
    }));
    let cache = Arc::new(AnalysisCache::new());
    let engine = llm_engine(client.clone(), cache.clone());

    let outcome = engine.analyze(&two_chunk_reviews(), "Game", None).await.unwrap();

    assert_eq!(outcome.engine, EngineKind::RuleBased);
    assert_eq!(outcome.positive.insights[0].category, "Visuals");
    assert!(cache.is_empty().await);

    // nothing cached, so the next call tries the LLM again
    engine.analyze(&two_chunk_reviews(), "Game", None).await.unwrap();
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn test_empty_table_without_llm_calls() {
    let client = Arc::new(StubClient::new(happy_responder));
    let engine = llm_engine(client.clone(), Arc::new(AnalysisCache::new()));

    let outcome = engine.analyze(&[], "Game", None).await.unwrap();

    assert_eq!(client.calls(), 0);
    assert_eq!(outcome.engine, EngineKind::RuleBased);
    assert!(outcome.positive.insights.is_empty());
    assert!(outcome.negative.insights.is_empty());
}

#[tokio::test]
async fn test_keyword_engine_is_deterministic() {
    let engine = InsightEngine::new(
        None,
        AnalysisSettings::default(),
        KeywordTable::default(),
        Arc::new(AnalysisCache::new()),
    );
    let reviews = vec![
        review("The story and the ending are great, fun mechanics", true, 30.0),
        review("Server lag and constant disconnect, one crash", false, 5.0),
    ];

    let first = engine.analyze(&reviews, "Game", None).await.unwrap();
    let second = engine.analyze(&reviews, "Game", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.engine, EngineKind::RuleBased);
    assert_eq!(first.negative.insights[0].category, "Networking");
    assert_eq!(first.negative.insights[0].score, 3);
}
