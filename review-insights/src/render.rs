//! Plain-text rendering for the CLI

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use uuid::Uuid;

use crate::analysis::{ChurnDiagnosis, Insight, InsightOutcome, Sentiment};

/// Entities shown per class
pub const ENTITY_DISPLAY_CAP: usize = 6;

fn heading(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "Strengths",
        Sentiment::Negative => "Weaknesses",
    }
}

fn write_insights(out: &mut String, insights: &[Insight]) {
    if insights.is_empty() {
        out.push_str("  (no data)\n");
        return;
    }
    for (i, insight) in insights.iter().enumerate() {
        let marker = if insight.is_dominant { " [dominant]" } else { "" };
        let _ = writeln!(
            out,
            "  {}. {} ({}){}",
            i + 1,
            insight.category,
            insight.score,
            marker
        );
        let _ = writeln!(out, "     {}", insight.description);
    }
}

/// JSON output wrapper identifying one CLI run
#[derive(Debug, Serialize)]
pub struct RunEnvelope<'a, T: Serialize> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub product: &'a str,
    pub result: &'a T,
}

impl<'a, T: Serialize> RunEnvelope<'a, T> {
    pub fn new(product: &'a str, result: &'a T) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            product,
            result,
        }
    }
}

pub fn render_json<T: Serialize>(product: &str, result: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RunEnvelope::new(product, result))?)
}

pub fn render_outcome(product: &str, outcome: &InsightOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - engine: {}", product, outcome.engine);

    for sentiment in Sentiment::ALL {
        let report = outcome.get(sentiment);
        let _ = writeln!(out, "\n{}:", heading(sentiment));
        write_insights(&mut out, &report.insights);

        if !report.entities.is_empty() {
            let shown: Vec<&str> = report
                .entities
                .iter()
                .take(ENTITY_DISPLAY_CAP)
                .map(String::as_str)
                .collect();
            let _ = writeln!(out, "  Mentioned: {}", shown.join(", "));
        }
    }
    out
}

pub fn render_diagnosis(product: &str, diagnosis: &ChurnDiagnosis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - early churn", product);
    let _ = writeln!(
        out,
        "  Refund reviews: {} of {} ({:.2}%) - {}",
        diagnosis.refund_reviews, diagnosis.total_reviews, diagnosis.churn_rate, diagnosis.health
    );
    let _ = writeln!(out, "\nTop reasons:");
    write_insights(&mut out, &diagnosis.reasons);
    out
}
