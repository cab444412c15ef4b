//! Prompt builders for every LLM call the pipeline makes

use crate::analysis::types::Sentiment;
use crate::llm::{ChatMessage, CompletionRequest};

/// Separator between map summaries in the reduce input
pub const SUMMARY_SEPARATOR: &str = "\n---\n";

/// Map phase: bullet summary of one review slice
pub fn map_request(product: &str, sentiment: Sentiment, chunk: &str, temperature: f32) -> CompletionRequest {
    let prompt = format!(
        r#"Subject: player reviews of the game "{product}".
Task: read the review excerpt below and list the 3-5 most important {target} it mentions, as short bullet points.
Requirement: if a player names a specific level, character, boss or map, keep that name verbatim in your summary.

Review excerpt:
{chunk}"#,
        product = product,
        target = sentiment.target(),
        chunk = chunk,
    );
    CompletionRequest::new(vec![ChatMessage::user(prompt)], temperature)
}

/// Reduce phase: aggregate map summaries into the insights/entities JSON
pub fn reduce_request(
    product: &str,
    sentiment: Sentiment,
    combined_summaries: &str,
    temperature: f32,
) -> CompletionRequest {
    let entity_instruction = match sentiment {
        Sentiment::Positive => {
            "4. Entity extraction: identify the specific levels or bosses named as highlight moments and list them in the \"entities\" field."
        }
        Sentiment::Negative => {
            "4. Entity extraction: identify the specific levels, bosses or maps that players complain about most often and list them in the \"entities\" field."
        }
    };

    let system = format!(
        r#"You are a senior games editor writing the {target} report for "{product}".
Follow these steps:
1. Deduplicate and merge overlapping points.
2. Reason step by step internally before deciding on the ranking.
3. Output strictly formatted data, ranked by importance.
{entity_instruction}

IMPORTANT: respond with exactly one JSON object in this shape and nothing else:
{{
    "insights": [
        {{"category": "keyword", "desc": "professional assessment...", "score": 95}},
        {{"category": "keyword", "desc": "professional assessment...", "score": 80}}
    ],
    "entities": ["name 1", "name 2"]
}}
"score" is an integer from 0 to 100."#,
        target = sentiment.target(),
        product = product,
        entity_instruction = entity_instruction,
    );

    CompletionRequest::new(
        vec![
            ChatMessage::system(system),
            ChatMessage::user(format!("Summaries to aggregate:\n{}", combined_summaries)),
        ],
        temperature,
    )
}

/// Retrieval Q&A over the reviews matching `query`
pub fn qa_request(
    product: &str,
    query: &str,
    match_count: usize,
    context: &str,
    temperature: f32,
) -> CompletionRequest {
    let system = format!(
        r#"You are an improvement consultant for the game "{product}". The user is asking about feedback on "{query}".
{match_count} related reviews were retrieved; answer from that context.
Structure your answer in three parts:
1. Current state summary
2. Concrete details
3. Improvement suggestions
Tone: objective and professional."#,
        product = product,
        query = query,
        match_count = match_count,
    );

    CompletionRequest::new(
        vec![
            ChatMessage::system(system),
            ChatMessage::user(format!("Context:\n{}", context)),
        ],
        temperature,
    )
}

/// Early-refund reasons as a JSON array
pub fn refund_request(product: &str, text: &str, temperature: f32) -> CompletionRequest {
    let system = format!(
        r#"Analyze the negative reviews of "{product}" written within two hours of play, i.e. likely refunds. Find the top 5 reasons players quit.
Respond strictly with a JSON array and nothing else: [{{"category": "reason", "desc": "short explanation", "score": 90}}]
"score" is an integer from 0 to 100."#,
        product = product,
    );

    CompletionRequest::new(
        vec![ChatMessage::system(system), ChatMessage::user(text.to_string())],
        temperature,
    )
}
