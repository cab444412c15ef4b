//! Map-reduce orchestration
//!
//! 1. Chunk both corpora; no chunks means no result and no LLM calls.
//! 2. Summarize every chunk concurrently, at most `concurrency` in flight.
//! 3. Wait for every map task (the barrier), then reduce each class that
//!    has at least one non-empty summary. The two reduce calls run
//!    concurrently.
//! 4. Return the report, or `None` when no class produced data.

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Instant;
use tracing::{debug, info, warn};

use review_insights_sdk::{log_phase_complete, log_phase_start, PHASE_MAP, PHASE_REDUCE};

use crate::analysis::chunker::chunk_corpus;
use crate::analysis::map_phase::summarize_chunk;
use crate::analysis::progress::{ProgressSender, ProgressTracker};
use crate::analysis::reduce_phase::reduce_sentiment;
use crate::analysis::types::{AnalysisReport, MapResult, ReviewCorpus, Sentiment};
use crate::config::AnalysisSettings;
use crate::llm::CompletionClient;
use crate::pipeline_utils::execute_batch;

/// Non-empty map summaries per class, in completion order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapSummaries {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl MapSummaries {
    pub fn from_results(results: Vec<MapResult>) -> Self {
        let mut summaries = Self::default();
        for result in results {
            if result.summary.is_empty() {
                debug!("Dropping empty summary from {}", result.label);
                continue;
            }
            match result.sentiment {
                Sentiment::Positive => summaries.positive.push(result.summary),
                Sentiment::Negative => summaries.negative.push(result.summary),
            }
        }
        summaries
    }

    pub fn get(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }
}

/// Run the full map-reduce analysis for one product
pub async fn run_map_reduce(
    client: &dyn CompletionClient,
    corpus: &ReviewCorpus,
    product: &str,
    settings: &AnalysisSettings,
    progress: Option<ProgressSender>,
) -> Result<Option<AnalysisReport>> {
    let pipeline_start = Instant::now();

    let chunks = chunk_corpus(corpus, settings.chunk_size, settings.max_chunks_per_sentiment);
    if chunks.is_empty() {
        info!("No review text to analyze - product={}", product);
        return Ok(None);
    }

    let total_tasks = chunks.len();
    let positive_chunks = chunks
        .iter()
        .filter(|c| c.sentiment == Sentiment::Positive)
        .count();
    info!(
        "Map phase starting - product={}, chunks={} (positive={}, negative={}), concurrency={}",
        product,
        total_tasks,
        positive_chunks,
        total_tasks - positive_chunks,
        settings.concurrency
    );

    let mut tracker = ProgressTracker::new(total_tasks, settings.map_progress_share, progress);

    // 1) map: every chunk, bounded width
    log_phase_start!(PHASE_MAP, "Map");
    let map_start = Instant::now();
    let results = execute_batch(
        PHASE_MAP,
        chunks,
        settings.concurrency,
        |chunk, ctx| summarize_chunk(client, product, chunk, settings.map_temperature, ctx),
        |result: &MapResult, _ctx| {
            tracker.record_map(&result.label);
        },
    )
    .await?;
    log_phase_complete!(PHASE_MAP, "Map");

    // 2) barrier passed: every map task has reported
    let summaries = MapSummaries::from_results(results);
    let failed = total_tasks - summaries.positive.len() - summaries.negative.len();
    if failed > 0 {
        warn!("Map phase dropped {} of {} chunks", failed, total_tasks);
    }
    info!(
        "Map phase completed - duration={:.2}s, summaries={} (positive={}, negative={})",
        map_start.elapsed().as_secs_f32(),
        total_tasks - failed,
        summaries.positive.len(),
        summaries.negative.len()
    );

    // 3) reduce each class with data
    let classes: Vec<Sentiment> = Sentiment::ALL
        .into_iter()
        .filter(|s| !summaries.get(*s).is_empty())
        .collect();

    let mut report = AnalysisReport::default();
    if !classes.is_empty() {
        log_phase_start!(PHASE_REDUCE, "Reduce");
        let reduce_start = Instant::now();
        tracker.start_reduce(classes.len());

        let mut reductions: FuturesUnordered<_> = classes
            .iter()
            .map(|&sentiment| {
                let summaries = summaries.get(sentiment);
                async move {
                    let reduced = reduce_sentiment(
                        client,
                        product,
                        sentiment,
                        summaries,
                        settings.reduce_temperature,
                    )
                    .await;
                    (sentiment, reduced)
                }
            })
            .collect();

        while let Some((sentiment, reduced)) = reductions.next().await {
            tracker.record_reduce(sentiment);
            if reduced.is_none() {
                warn!("No {} insights after reduce", sentiment);
            }
            report.set(sentiment, reduced);
        }

        log_phase_complete!(PHASE_REDUCE, "Reduce");
        info!(
            "Reduce phase completed - duration={:.2}s, classes={}",
            reduce_start.elapsed().as_secs_f32(),
            classes.len()
        );
    }

    tracker.finish();
    info!(
        "Map-reduce finished - product={}, total_duration={:.2}s",
        product,
        pipeline_start.elapsed().as_secs_f32()
    );

    if report.is_empty() {
        warn!("Map-reduce produced no data - product={}", product);
        return Ok(None);
    }
    Ok(Some(report))
}
