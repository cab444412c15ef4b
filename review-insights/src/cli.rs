//! Command-line interface for review-insights.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::analysis::Review;
use crate::config::Config;

/// Map-reduce LLM analysis of game reviews
///
/// Splits recommended and non-recommended reviews into slices, summarizes
/// each slice concurrently, then aggregates one ranked report per sentiment.
/// Without an API key the analysis falls back to keyword scoring.
#[derive(Parser, Debug, Clone)]
#[command(name = "review-insights")]
#[command(about = "Map-reduce LLM analysis of game reviews")]
#[command(version)]
pub struct Args {
    /// Path to a config.yaml (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of concurrent map requests
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract ranked strengths, weaknesses and named entities
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Answer a free-text question from the matching reviews
    Ask {
        #[command(flatten)]
        input: InputArgs,

        /// Keyword looked up in the review text
        #[arg(long)]
        query: String,
    },

    /// Diagnose early churn among short-playtime negative reviews
    Refund {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Review table as a JSON or YAML array
    #[arg(long, value_name = "PATH")]
    pub reviews: PathBuf,

    /// Product (game) name used in prompts and as the cache key
    #[arg(long)]
    pub product: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl Args {
    /// Apply CLI overrides on top of the resolved config
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(concurrency) = self.concurrency {
            config.analysis.concurrency = concurrency;
        }
        config.validate()
    }

    pub fn input(&self) -> &InputArgs {
        match &self.command {
            Command::Analyze { input, .. }
            | Command::Ask { input, .. }
            | Command::Refund { input, .. } => input,
        }
    }
}

/// Load a review table; `.yaml`/`.yml` parse as YAML, anything else as JSON
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reviews: {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse review YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse review JSON: {}", path.display()))
    }
}
