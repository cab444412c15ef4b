//! Reduce phase: merge one class's map summaries into insights and entities
//!
//! The response must be exactly the reduce JSON object (optionally fenced).
//! Anything else, including a partially valid object, makes the class absent.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::analysis::prompts::{reduce_request, SUMMARY_SEPARATOR};
use crate::analysis::types::{Insight, Sentiment, SentimentReport};
use crate::llm::CompletionClient;
use crate::pipeline_utils::{parse_json, DecodeError};

/// Highest score an insight may carry
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReduceResponse {
    insights: Vec<InsightWire>,
    entities: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct InsightWire {
    category: String,
    desc: String,
    score: u32,
}

impl InsightWire {
    fn into_insight(self) -> Result<Insight, DecodeError> {
        if self.score > MAX_SCORE {
            return Err(DecodeError::Invalid(format!(
                "score {} for '{}' exceeds {}",
                self.score, self.category, MAX_SCORE
            )));
        }
        Ok(Insight::new(self.category, self.desc, self.score))
    }
}

/// Convert decoded wire insights, rejecting the whole list on one bad score
pub(crate) fn validate_insights(wire: Vec<InsightWire>) -> Result<Vec<Insight>, DecodeError> {
    wire.into_iter().map(InsightWire::into_insight).collect()
}

/// Strictly decode a reduce response body
pub fn decode_reduce_response(text: &str) -> Result<SentimentReport, DecodeError> {
    let response: ReduceResponse = parse_json(text)?;
    Ok(SentimentReport {
        insights: validate_insights(response.insights)?,
        entities: response.entities,
    })
}

/// Join non-empty summaries in arrival order
pub fn combine_summaries(summaries: &[String]) -> String {
    summaries
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

/// Aggregate one class; `None` on request or decode failure
pub async fn reduce_sentiment(
    client: &dyn CompletionClient,
    product: &str,
    sentiment: Sentiment,
    summaries: &[String],
    temperature: f32,
) -> Option<SentimentReport> {
    let combined = combine_summaries(summaries);
    if combined.is_empty() {
        return None;
    }
    debug!(
        "Reducing {} summaries - sentiment={}, chars={}",
        summaries.len(),
        sentiment,
        combined.chars().count()
    );

    let request = reduce_request(product, sentiment, &combined, temperature);
    let text = match client.complete(request).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Reduce request failed - sentiment={}: {}", sentiment, e);
            return None;
        }
    };

    match decode_reduce_response(&text) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Reduce response rejected - sentiment={}: {}", sentiment, e);
            None
        }
    }
}
