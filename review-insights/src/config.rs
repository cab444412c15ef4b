//! Configuration for analysis runs
//!
//! Values resolve in this order: built-in defaults, then a YAML file
//! (`--config`, else `config.yaml` in the platform config directory if it
//! exists), then the LLM credential from the environment. The credential is
//! the only thing read from the environment.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables checked for the LLM credential, in order
pub const API_KEY_VARS: [&str; 2] = ["REVIEW_INSIGHTS_API_KEY", "DEEPSEEK_API_KEY"];

/// Prefix a credential must carry to enable LLM mode
pub const API_KEY_PREFIX: &str = "sk-";

/// LLM endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Bearer credential; never written back to disk
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    /// Presence/format check only, not a liveness probe
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| key.trim().starts_with(API_KEY_PREFIX))
            .unwrap_or(false)
    }
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Maximum characters per map chunk
    pub chunk_size: usize,
    /// Maximum chunks per sentiment class
    pub max_chunks_per_sentiment: usize,
    /// Simultaneous in-flight map requests
    pub concurrency: usize,
    pub map_temperature: f32,
    pub reduce_temperature: f32,
    pub qa_temperature: f32,
    /// Matching reviews passed to the Q&A prompt
    pub qa_context_limit: usize,
    /// Top insight is dominant when its score exceeds the runner-up times this
    pub dominance_ratio: f64,
    /// Share of the progress range reserved for the map phase
    pub map_progress_share: f32,
    /// Characters of refund-review text sent to the LLM
    pub refund_text_limit: usize,
    /// Reviews at or under this playtime count as refund candidates
    pub refund_playtime_hours: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            chunk_size: 3000,
            max_chunks_per_sentiment: 4,
            concurrency: 6,
            map_temperature: 0.3,
            reduce_temperature: 0.3,
            qa_temperature: 0.4,
            qa_context_limit: 40,
            dominance_ratio: 1.2,
            map_progress_share: 0.9,
            refund_text_limit: 4000,
            refund_playtime_hours: 2.0,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    /// Optional YAML keyword table replacing the built-in fallback table
    pub keywords: Option<PathBuf>,
}

impl Config {
    /// Parse a YAML document; missing sections keep their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Resolve the full configuration for a CLI run
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                debug!("Using config file from --config argument: {}", path.display());
                Self::from_file(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Using config file from config directory: {}", path.display());
                    Self::from_file(&path)?
                }
                None => {
                    debug!("No config file found, using defaults");
                    Config::default()
                }
            },
        };

        dotenv::dotenv().ok();
        config.llm.api_key = api_key_from_env().or(config.llm.api_key);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        if a.chunk_size == 0 {
            bail!("analysis.chunk_size must be greater than 0");
        }
        if a.max_chunks_per_sentiment == 0 {
            bail!("analysis.max_chunks_per_sentiment must be greater than 0");
        }
        if a.concurrency == 0 {
            bail!("analysis.concurrency must be greater than 0");
        }
        if !(a.map_progress_share > 0.0 && a.map_progress_share < 1.0) {
            bail!(
                "analysis.map_progress_share must be between 0 and 1, got {}",
                a.map_progress_share
            );
        }
        if a.dominance_ratio < 1.0 {
            bail!(
                "analysis.dominance_ratio must be at least 1.0, got {}",
                a.dominance_ratio
            );
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

/// `config.yaml` inside the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    use directories::ProjectDirs;

    ProjectDirs::from("com", "review-insights", "review-insights")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
