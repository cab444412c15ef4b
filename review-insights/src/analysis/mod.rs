//! Review analysis pipeline
//!
//! Chunker -> map workers (bounded, concurrent) -> barrier -> one reduce per
//! sentiment class -> dominance. Without an LLM credential the keyword
//! fallback produces the same report shape.

pub mod cache;
pub mod chunker;
pub mod dominance;
pub mod engine;
pub mod fallback;
pub mod map_phase;
pub mod progress;
pub mod prompts;
pub mod qa;
pub mod reduce_phase;
pub mod refund;
pub mod scheduler;
pub mod types;

pub use cache::AnalysisCache;
pub use engine::{EngineKind, InsightEngine, InsightOutcome};
pub use fallback::KeywordTable;
pub use progress::{progress_channel, ProgressReceiver, ProgressSender, ProgressTracker};
pub use refund::{ChurnDiagnosis, ChurnHealth};
pub use scheduler::run_map_reduce;
pub use types::{AnalysisReport, Insight, Review, ReviewCorpus, Sentiment, SentimentReport};
