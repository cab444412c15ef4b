//! Event contract between the review-insights pipeline and its front ends.
//!
//! The pipeline reports lifecycle events as single-line JSON on stderr,
//! prefixed with [`EVENT_PREFIX`]. A dashboard (or any other observer) can
//! follow a run by reading stderr and feeding each line to [`parse_event`].
//!
//! In-process observers receive [`ProgressUpdate`] values over a channel
//! instead; the same updates are mirrored as [`AnalysisLog::ProgressUpdated`].

use serde::{Deserialize, Serialize};

/// Prefix marking a structured event line on stderr
pub const EVENT_PREFIX: &str = "__RI_EVENT__:";

/// Phase number of the per-chunk summarization phase
pub const PHASE_MAP: usize = 1;

/// Phase number of the per-sentiment aggregation phase
pub const PHASE_REDUCE: usize = 2;

/// Total number of phases in an analysis run
pub const TOTAL_PHASES: usize = 2;

/// Fractional progress of a running analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Overall completion in `[0.0, 1.0]`
    pub fraction: f32,
    /// What just happened, e.g. `positive slice 2/4`
    pub label: String,
}

impl ProgressUpdate {
    pub fn new(fraction: f32, label: impl Into<String>) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            label: label.into(),
        }
    }

    /// Whole-number percentage, rounded down
    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).floor() as u8
    }
}

/// Structured events emitted while an analysis runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisLog {
    /// Analysis engine chosen for a product
    EngineSelected { product: String, engine: String },
    /// Phase started
    PhaseStarted {
        phase: usize,
        name: String,
        total_phases: usize,
    },
    /// Phase completed
    PhaseCompleted { phase: usize, name: String },
    /// Task started
    TaskStarted {
        phase: usize,
        task_id: String,
        description: String,
        total_tasks: Option<usize>,
    },
    /// Task completed
    TaskCompleted {
        task_id: String,
        result: Option<String>,
    },
    /// Task failed; the run continues without its contribution
    TaskFailed { task_id: String, error: String },
    /// Overall progress moved
    ProgressUpdated { fraction: f32, label: String },
}

impl AnalysisLog {
    /// Emit this event to stderr for front-end parsing
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("{}{}", EVENT_PREFIX, json);
            // Concurrent tasks interleave; flush per line
            let _ = std::io::stderr().flush();
        }
    }
}

impl From<&ProgressUpdate> for AnalysisLog {
    fn from(update: &ProgressUpdate) -> Self {
        AnalysisLog::ProgressUpdated {
            fraction: update.fraction,
            label: update.label.clone(),
        }
    }
}

/// Parse one stderr line; `None` for plain output or malformed events
pub fn parse_event(line: &str) -> Option<AnalysisLog> {
    let json = line.trim_end().strip_prefix(EVENT_PREFIX)?;
    serde_json::from_str(json).ok()
}

#[macro_export]
macro_rules! log_engine_selected {
    ($product:expr, $engine:expr) => {
        $crate::AnalysisLog::EngineSelected {
            product: $product.to_string(),
            engine: $engine.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $name:expr) => {
        $crate::AnalysisLog::PhaseStarted {
            phase: $phase,
            name: $name.to_string(),
            total_phases: $crate::TOTAL_PHASES,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $name:expr) => {
        $crate::AnalysisLog::PhaseCompleted {
            phase: $phase,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_start {
    ($phase:expr, $task_id:expr, $desc:expr) => {
        $crate::AnalysisLog::TaskStarted {
            phase: $phase,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: None,
        }
        .emit();
    };
    ($phase:expr, $task_id:expr, $desc:expr, $total:expr) => {
        $crate::AnalysisLog::TaskStarted {
            phase: $phase,
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            total_tasks: Some($total),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_complete {
    ($task_id:expr) => {
        $crate::AnalysisLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $result:expr) => {
        $crate::AnalysisLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_failed {
    ($task_id:expr, $error:expr) => {
        $crate::AnalysisLog::TaskFailed {
            task_id: $task_id.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}
