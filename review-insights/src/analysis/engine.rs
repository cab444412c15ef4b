//! Insight engine: picks LLM map-reduce or keyword fallback, consults the
//! session cache and applies dominance to whatever it returns.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use review_insights_sdk::log_engine_selected;

use crate::analysis::cache::AnalysisCache;
use crate::analysis::dominance::apply_dominance;
use crate::analysis::fallback::{fallback_insights, score_texts, KeywordTable};
use crate::analysis::progress::ProgressSender;
use crate::analysis::qa::answer_query;
use crate::analysis::refund::{refund_reasons, refund_reviews, ChurnDiagnosis};
use crate::analysis::scheduler::run_map_reduce;
use crate::analysis::types::{AnalysisReport, Review, ReviewCorpus, Sentiment, SentimentReport};
use crate::config::{AnalysisSettings, Config};
use crate::llm::{CompletionClient, OpenAiCompatibleClient};

/// Provenance of an analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineKind {
    #[serde(rename = "LLM map-reduce")]
    MapReduce,
    #[serde(rename = "rule-based")]
    RuleBased,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::MapReduce => f.write_str("LLM map-reduce"),
            EngineKind::RuleBased => f.write_str("rule-based"),
        }
    }
}

/// Dominance-processed insights for both classes plus their provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightOutcome {
    pub engine: EngineKind,
    pub positive: SentimentReport,
    pub negative: SentimentReport,
}

impl InsightOutcome {
    pub fn get(&self, sentiment: Sentiment) -> &SentimentReport {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }

    fn from_report(engine: EngineKind, report: AnalysisReport, ratio: f64) -> Self {
        let mut outcome = Self {
            engine,
            positive: report.positive.unwrap_or_default(),
            negative: report.negative.unwrap_or_default(),
        };
        apply_dominance(&mut outcome.positive.insights, ratio);
        apply_dominance(&mut outcome.negative.insights, ratio);
        outcome
    }
}

pub struct InsightEngine {
    client: Option<Arc<dyn CompletionClient>>,
    settings: AnalysisSettings,
    keywords: KeywordTable,
    cache: Arc<AnalysisCache>,
}

impl InsightEngine {
    /// `client` of `None` means no credential: every analysis is rule-based
    pub fn new(
        client: Option<Arc<dyn CompletionClient>>,
        settings: AnalysisSettings,
        keywords: KeywordTable,
        cache: Arc<AnalysisCache>,
    ) -> Self {
        Self {
            client,
            settings,
            keywords,
            cache,
        }
    }

    pub fn from_config(config: &Config, cache: Arc<AnalysisCache>) -> Result<Self> {
        let client: Option<Arc<dyn CompletionClient>> = if config.llm.has_credential() {
            Some(Arc::new(OpenAiCompatibleClient::new(&config.llm)?))
        } else {
            debug!("No usable LLM credential, using keyword fallback");
            None
        };

        let keywords = match &config.keywords {
            Some(path) => KeywordTable::from_file(path)?,
            None => KeywordTable::default(),
        };

        Ok(Self::new(client, config.analysis.clone(), keywords, cache))
    }

    /// Engine a fresh analysis would use
    pub fn kind(&self) -> EngineKind {
        if self.client.is_some() {
            EngineKind::MapReduce
        } else {
            EngineKind::RuleBased
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Analyze a review table for `product`
    ///
    /// Map-reduce results are cached per product; a run that yields nothing
    /// degrades to the keyword fallback and is not cached.
    pub async fn analyze(
        &self,
        reviews: &[Review],
        product: &str,
        progress: Option<ProgressSender>,
    ) -> Result<InsightOutcome> {
        let corpus = ReviewCorpus::from_reviews(reviews);

        let Some(client) = &self.client else {
            log_engine_selected!(product, EngineKind::RuleBased);
            return Ok(self.rule_based(&corpus));
        };

        if !self.cache.needs_analysis(product).await {
            if let Some(report) = self.cache.get(product).await {
                info!("Using cached analysis - product={}", product);
                log_engine_selected!(product, EngineKind::MapReduce);
                return Ok(InsightOutcome::from_report(
                    EngineKind::MapReduce,
                    report,
                    self.settings.dominance_ratio,
                ));
            }
        }

        log_engine_selected!(product, EngineKind::MapReduce);
        match run_map_reduce(client.as_ref(), &corpus, product, &self.settings, progress).await? {
            Some(report) => {
                self.cache.store(product, report.clone()).await;
                Ok(InsightOutcome::from_report(
                    EngineKind::MapReduce,
                    report,
                    self.settings.dominance_ratio,
                ))
            }
            None => {
                warn!("Map-reduce yielded nothing, falling back to keywords - product={}", product);
                log_engine_selected!(product, EngineKind::RuleBased);
                Ok(self.rule_based(&corpus))
            }
        }
    }

    /// Free-text question over the review table; requires a credential
    pub async fn ask(&self, reviews: &[Review], product: &str, query: &str) -> Result<String> {
        let Some(client) = &self.client else {
            bail!("Q&A requires an LLM credential (set REVIEW_INSIGHTS_API_KEY)");
        };
        Ok(answer_query(client.as_ref(), reviews, product, query, &self.settings).await)
    }

    /// Churn rate, health and the top reasons early players leave
    pub async fn refund(&self, reviews: &[Review], product: &str) -> Result<ChurnDiagnosis> {
        let threshold = self.settings.refund_playtime_hours;
        let mut diagnosis = ChurnDiagnosis::measure(reviews, threshold);
        info!(
            "Churn measured - product={}, refund_reviews={}, rate={:.2}%, health={}",
            product, diagnosis.refund_reviews, diagnosis.churn_rate, diagnosis.health
        );

        let refunds = refund_reviews(reviews, threshold);
        if refunds.is_empty() {
            return Ok(diagnosis);
        }

        diagnosis.reasons = match &self.client {
            Some(client) => refund_reasons(client.as_ref(), product, &refunds, &self.settings).await,
            None => {
                let texts: Vec<String> = refunds.iter().map(|r| r.clean_content.clone()).collect();
                score_texts(&texts, self.keywords.categories(Sentiment::Negative))
            }
        };
        Ok(diagnosis)
    }

    fn rule_based(&self, corpus: &ReviewCorpus) -> InsightOutcome {
        let report = AnalysisReport {
            positive: Some(SentimentReport {
                insights: fallback_insights(corpus, Sentiment::Positive, &self.keywords),
                entities: Vec::new(),
            }),
            negative: Some(SentimentReport {
                insights: fallback_insights(corpus, Sentiment::Negative, &self.keywords),
                entities: Vec::new(),
            }),
        };
        InsightOutcome::from_report(EngineKind::RuleBased, report, self.settings.dominance_ratio)
    }
}
