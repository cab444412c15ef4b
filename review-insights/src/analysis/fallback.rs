//! Rule-based insight extraction used when no LLM credential is configured
//!
//! Each category's score is the number of case-insensitive keyword
//! occurrences in the class's concatenated text. Pure function of its input;
//! never touches the network.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::types::{Insight, ReviewCorpus, Sentiment};

/// Categories kept per class
pub const FALLBACK_TOP_N: usize = 3;

/// One keyword-scored category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub category: String,
    pub keywords: Vec<String>,
    #[serde(rename = "desc")]
    pub description: String,
}

impl KeywordCategory {
    fn new(category: &str, keywords: &[&str], description: &str) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Ordered keyword table; order breaks score ties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub positive: Vec<KeywordCategory>,
    pub negative: Vec<KeywordCategory>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            positive: vec![
                KeywordCategory::new(
                    "Visuals",
                    &["画面", "画质", "风景", "光影", "美术", "graphics", "visuals", "scenery", "lighting", "art style"],
                    "Strong visual presentation with an art style that appeals to a broad audience.",
                ),
                KeywordCategory::new(
                    "Gameplay",
                    &["好玩", "上头", "有趣", "机制", "玩法", "fun", "addictive", "mechanics", "gameplay"],
                    "Engaging core gameplay with high replay value.",
                ),
                KeywordCategory::new(
                    "Story",
                    &["剧情", "故事", "结局", "人设", "角色", "story", "plot", "ending", "characters"],
                    "Complete narrative with well-developed characters.",
                ),
            ],
            negative: vec![
                KeywordCategory::new(
                    "Performance",
                    &["掉帧", "卡顿", "闪退", "优化", "stutter", "fps drops", "optimization", "crash"],
                    "Noticeable performance problems hurt smoothness.",
                ),
                KeywordCategory::new(
                    "Bugs",
                    &["bug", "报错", "坏档", "glitch", "corrupted save"],
                    "Frequent technical faults that need urgent fixes.",
                ),
                KeywordCategory::new(
                    "Networking",
                    &["掉线", "连不上", "服务器", "延迟", "disconnect", "server", "latency", "lag"],
                    "Poor online experience and unstable multiplayer connections.",
                ),
            ],
        }
    }
}

impl KeywordTable {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse keyword table YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword table: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn categories(&self, sentiment: Sentiment) -> &[KeywordCategory] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }
}

/// Non-overlapping, case-insensitive occurrences of `keyword` in `haystack`
///
/// `haystack` must already be lowercased.
fn count_occurrences(haystack: &str, keyword: &str) -> u32 {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle.as_str()).count() as u32
}

/// Score `texts` against one class's categories, best first, top 3
pub fn score_texts(texts: &[String], categories: &[KeywordCategory]) -> Vec<Insight> {
    let haystack = texts.join(" ").to_lowercase();
    if haystack.trim().is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Insight> = categories
        .iter()
        .filter_map(|cat| {
            let score: u32 = cat
                .keywords
                .iter()
                .map(|kw| count_occurrences(&haystack, kw))
                .sum();
            (score > 0).then(|| Insight::new(&cat.category, &cat.description, score))
        })
        .collect();

    // stable: ties keep table order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(FALLBACK_TOP_N);
    scored
}

/// Fallback insights for one class of a corpus
pub fn fallback_insights(corpus: &ReviewCorpus, sentiment: Sentiment, table: &KeywordTable) -> Vec<Insight> {
    score_texts(corpus.texts(sentiment), table.categories(sentiment))
}
