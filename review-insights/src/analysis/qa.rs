//! Retrieval Q&A: literal substring lookup plus one LLM summarization

use tracing::{info, warn};

use crate::analysis::prompts::qa_request;
use crate::analysis::types::Review;
use crate::config::AnalysisSettings;
use crate::llm::CompletionClient;

/// Reviews whose text contains `query`, case-insensitively, in table order
pub fn matching_reviews<'a>(reviews: &'a [Review], query: &str) -> Vec<&'a Review> {
    let needle = query.to_lowercase();
    reviews
        .iter()
        .filter(|r| r.clean_content.to_lowercase().contains(&needle))
        .collect()
}

pub fn no_match_message(query: &str) -> String {
    format!("No reviews mention \"{}\".", query)
}

/// Answer a free-text question; never fails, errors come back inline
pub async fn answer_query(
    client: &dyn CompletionClient,
    reviews: &[Review],
    product: &str,
    query: &str,
    settings: &AnalysisSettings,
) -> String {
    let matches = matching_reviews(reviews, query);
    if matches.is_empty() {
        info!("Q&A found no matching reviews - query={:?}", query);
        return no_match_message(query);
    }

    let context = matches
        .iter()
        .take(settings.qa_context_limit)
        .map(|r| r.clean_content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    info!(
        "Q&A answering - query={:?}, matches={}, context_reviews={}",
        query,
        matches.len(),
        matches.len().min(settings.qa_context_limit)
    );

    let request = qa_request(product, query, matches.len(), &context, settings.qa_temperature);
    match client.complete(request).await {
        Ok(answer) => answer.trim().to_string(),
        Err(e) => {
            warn!("Q&A request failed - query={:?}: {}", query, e);
            format!("Analysis failed: {}", e)
        }
    }
}
