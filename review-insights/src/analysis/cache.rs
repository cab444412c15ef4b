//! Session-scoped cache of map-reduce reports, keyed by product

use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::analysis::types::AnalysisReport;

#[derive(Debug, Default)]
struct CacheState {
    last_product: Option<String>,
    reports: HashMap<String, AnalysisReport>,
}

/// Shared between engine calls of one session; starts empty
#[derive(Debug, Default)]
pub struct AnalysisCache {
    state: Mutex<CacheState>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `product` is not the last analyzed one or has no entry
    pub async fn needs_analysis(&self, product: &str) -> bool {
        let state = self.state.lock().await;
        state.last_product.as_deref() != Some(product) || !state.reports.contains_key(product)
    }

    pub async fn get(&self, product: &str) -> Option<AnalysisReport> {
        self.state.lock().await.reports.get(product).cloned()
    }

    /// Replace the entry for `product` and mark it as last analyzed
    pub async fn store(&self, product: &str, report: AnalysisReport) {
        let mut state = self.state.lock().await;
        debug!("Caching analysis report - product={}", product);
        state.reports.insert(product.to_string(), report);
        state.last_product = Some(product.to_string());
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.reports.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
