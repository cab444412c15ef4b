//! Progress tracking across the map and reduce phases
//!
//! The tracker is owned by the coordinating future; workers never touch it.
//! Each update is sent to an optional observer channel and mirrored as an
//! [`AnalysisLog::ProgressUpdated`] event.

use review_insights_sdk::{AnalysisLog, ProgressUpdate};
use tokio::sync::mpsc;

use crate::analysis::types::Sentiment;

pub type ProgressSender = mpsc::UnboundedSender<ProgressUpdate>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressUpdate>;

/// Channel pair for observing a run
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug)]
pub struct ProgressTracker {
    map_total: usize,
    map_completed: usize,
    reduce_total: usize,
    reduce_completed: usize,
    /// Portion of `[0, 1]` covered by the map phase
    map_share: f32,
    sender: Option<ProgressSender>,
}

impl ProgressTracker {
    pub fn new(map_total: usize, map_share: f32, sender: Option<ProgressSender>) -> Self {
        Self {
            map_total,
            map_completed: 0,
            reduce_total: 0,
            reduce_completed: 0,
            map_share,
            sender,
        }
    }

    pub fn map_completed(&self) -> usize {
        self.map_completed
    }

    /// One map task finished (successfully or not)
    pub fn record_map(&mut self, label: &str) -> ProgressUpdate {
        self.map_completed = (self.map_completed + 1).min(self.map_total);
        let fraction = if self.map_total == 0 {
            self.map_share
        } else {
            self.map_completed as f32 / self.map_total as f32 * self.map_share
        };
        self.publish(ProgressUpdate::new(fraction, label))
    }

    /// Map barrier passed; `reduce_total` aggregations follow
    pub fn start_reduce(&mut self, reduce_total: usize) -> ProgressUpdate {
        self.reduce_total = reduce_total;
        self.reduce_completed = 0;
        self.publish(ProgressUpdate::new(self.map_share, "aggregating insights and entities"))
    }

    pub fn record_reduce(&mut self, sentiment: Sentiment) -> ProgressUpdate {
        self.reduce_completed = (self.reduce_completed + 1).min(self.reduce_total);
        let reduce_share = 1.0 - self.map_share;
        let fraction = if self.reduce_total == 0 {
            1.0
        } else {
            self.map_share
                + self.reduce_completed as f32 / self.reduce_total as f32 * reduce_share
        };
        self.publish(ProgressUpdate::new(fraction, format!("{} insights aggregated", sentiment)))
    }

    pub fn finish(&mut self) -> ProgressUpdate {
        self.publish(ProgressUpdate::new(1.0, "analysis complete"))
    }

    fn publish(&self, update: ProgressUpdate) -> ProgressUpdate {
        AnalysisLog::from(&update).emit();
        if let Some(sender) = &self.sender {
            // A dropped observer does not affect the run
            let _ = sender.send(update.clone());
        }
        update
    }
}
