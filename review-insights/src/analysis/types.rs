//! Data structures for review analysis

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the cleaned review table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Review text after boilerplate removal
    #[serde(alias = "content")]
    pub clean_content: String,

    /// Whether the reviewer recommends the product
    #[serde(alias = "recommended")]
    pub voted_up: bool,

    #[serde(default)]
    pub playtime_hours: f64,

    /// Helpful-vote count
    #[serde(default)]
    pub votes_up: u64,

    #[serde(default)]
    pub quality_score: f64,
}

/// Sentiment class partitioning the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 2] = [Sentiment::Positive, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }

    /// What a summary of this class looks for
    pub fn target(&self) -> &'static str {
        match self {
            Sentiment::Positive => "strengths",
            Sentiment::Negative => "weaknesses",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review texts split by recommendation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewCorpus {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl ReviewCorpus {
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Self {
        Self { positive, negative }
    }

    pub fn from_reviews(reviews: &[Review]) -> Self {
        let (positive, negative): (Vec<&Review>, Vec<&Review>) =
            reviews.iter().partition(|r| r.voted_up);
        Self {
            positive: positive.into_iter().map(|r| r.clean_content.clone()).collect(),
            negative: negative.into_iter().map(|r| r.clean_content.clone()).collect(),
        }
    }

    pub fn texts(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }

    /// All texts of one class joined by single spaces
    pub fn joined(&self, sentiment: Sentiment) -> String {
        self.texts(sentiment).join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// A bounded slice of one corpus, consumed by exactly one map task
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub sentiment: Sentiment,
    /// 0-based position within its corpus
    pub index: usize,
    /// Number of chunks produced for this corpus
    pub total: usize,
    pub text: String,
}

impl TextChunk {
    /// Human label, e.g. `positive slice 2/4`
    pub fn label(&self) -> String {
        format!("{} slice {}/{}", self.sentiment, self.index + 1, self.total)
    }

    pub fn task_id(&self) -> String {
        format!("map_{}_{}", self.sentiment, self.index + 1)
    }
}

/// Output of one map task; empty summary on failure
#[derive(Debug, Clone, PartialEq)]
pub struct MapResult {
    pub sentiment: Sentiment,
    pub label: String,
    pub summary: String,
}

/// A ranked finding within one sentiment class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    #[serde(rename = "desc")]
    pub description: String,
    /// 0-100
    pub score: u32,
    #[serde(default)]
    pub is_dominant: bool,
}

impl Insight {
    pub fn new(category: impl Into<String>, description: impl Into<String>, score: u32) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
            score,
            is_dominant: false,
        }
    }
}

/// Insights and entities for one sentiment class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub insights: Vec<Insight>,
    pub entities: Vec<String>,
}

/// Terminal artifact of an analysis run; a class with no data is absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<SentimentReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<SentimentReport>,
}

impl AnalysisReport {
    pub fn get(&self, sentiment: Sentiment) -> Option<&SentimentReport> {
        match sentiment {
            Sentiment::Positive => self.positive.as_ref(),
            Sentiment::Negative => self.negative.as_ref(),
        }
    }

    pub fn set(&mut self, sentiment: Sentiment, report: Option<SentimentReport>) {
        match sentiment {
            Sentiment::Positive => self.positive = report,
            Sentiment::Negative => self.negative = report,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_none() && self.negative.is_none()
    }
}
