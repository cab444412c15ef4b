//! Early-churn ("refund") diagnosis
//!
//! A refund review is a non-recommending review written at or under the
//! playtime threshold. The churn rate is their share of the whole table.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::analysis::prompts::refund_request;
use crate::analysis::reduce_phase::{validate_insights, InsightWire};
use crate::analysis::types::{Insight, Review};
use crate::config::AnalysisSettings;
use crate::llm::CompletionClient;
use crate::pipeline_utils::{parse_json, DecodeError};

/// Reasons kept from the LLM answer
pub const MAX_REFUND_REASONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnHealth {
    Excellent,
    Warning,
    Critical,
}

impl ChurnHealth {
    pub fn from_rate(churn_rate: f64) -> Self {
        if churn_rate < 1.0 {
            ChurnHealth::Excellent
        } else if churn_rate < 2.5 {
            ChurnHealth::Warning
        } else {
            ChurnHealth::Critical
        }
    }
}

impl fmt::Display for ChurnHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChurnHealth::Excellent => "Excellent",
            ChurnHealth::Warning => "Warning",
            ChurnHealth::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnDiagnosis {
    pub refund_reviews: usize,
    pub total_reviews: usize,
    /// Percent of all reviews
    pub churn_rate: f64,
    pub health: ChurnHealth,
    pub reasons: Vec<Insight>,
}

impl ChurnDiagnosis {
    /// Counts and health for `reviews`; reasons are filled in separately
    pub fn measure(reviews: &[Review], playtime_hours: f64) -> Self {
        let refund_count = refund_reviews(reviews, playtime_hours).len();
        let rate = churn_rate(refund_count, reviews.len());
        Self {
            refund_reviews: refund_count,
            total_reviews: reviews.len(),
            churn_rate: rate,
            health: ChurnHealth::from_rate(rate),
            reasons: Vec::new(),
        }
    }
}

pub fn refund_reviews(reviews: &[Review], playtime_hours: f64) -> Vec<&Review> {
    reviews
        .iter()
        .filter(|r| !r.voted_up && r.playtime_hours <= playtime_hours)
        .collect()
}

pub fn churn_rate(refund_count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    refund_count as f64 / total as f64 * 100.0
}

/// Refund texts joined by spaces, cut to `limit` characters
pub fn refund_text(refunds: &[&Review], limit: usize) -> String {
    let joined = refunds
        .iter()
        .map(|r| r.clean_content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(limit).collect()
}

/// Strictly decode the reasons array
pub fn decode_refund_reasons(text: &str) -> Result<Vec<Insight>, DecodeError> {
    let wire: Vec<InsightWire> = parse_json(text)?;
    let mut reasons = validate_insights(wire)?;
    reasons.truncate(MAX_REFUND_REASONS);
    Ok(reasons)
}

/// Ask the LLM why early players leave; empty on any failure
pub async fn refund_reasons(
    client: &dyn CompletionClient,
    product: &str,
    refunds: &[&Review],
    settings: &AnalysisSettings,
) -> Vec<Insight> {
    if refunds.is_empty() {
        return Vec::new();
    }

    let text = refund_text(refunds, settings.refund_text_limit);
    info!(
        "Diagnosing refund reasons - product={}, reviews={}, chars={}",
        product,
        refunds.len(),
        text.chars().count()
    );

    let request = refund_request(product, &text, settings.reduce_temperature);
    let response = match client.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Refund request failed - product={}: {}", product, e);
            return Vec::new();
        }
    };

    decode_refund_reasons(&response).unwrap_or_else(|e| {
        warn!("Refund response rejected - product={}: {}", product, e);
        Vec::new()
    })
}
