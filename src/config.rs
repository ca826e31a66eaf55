use crate::error::{AggregatorError, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;

/// Runtime configuration loaded from `config.toml`.
///
/// Every section has working defaults so the pipeline can run without a
/// config file at all; the file exists to change thresholds and to describe
/// the source roster without touching code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metro: MetroConfig,
    pub pipeline: PipelineConfig,
    /// Optional path to a heuristics TOML overriding the built-in catalog.
    pub heuristics_file: Option<String>,
    pub sources: Vec<SourceConfig>,
}

/// The metro region the catalog covers. Candidate times are civil times in
/// this region, so the validation window is evaluated against its clock and
/// not the clock of whatever machine happens to run the aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetroConfig {
    pub city: String,
    pub state: String,
    pub timezone: String,
}

impl MetroConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AggregatorError::Timezone(self.timezone.clone()))
    }
}

/// Validation window and duplicate-detection thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_past_days: i64,
    pub max_future_days: i64,
    pub title_similarity_threshold: f64,
    pub venue_similarity_threshold: f64,
    pub max_start_delta_secs: i64,
}

/// One registered candidate source. Sources marked `skip` are not collected
/// this run; their previously persisted records are preserved instead.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub candidates_file: String,
    #[serde(default)]
    pub skip: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metro: MetroConfig::default(),
            pipeline: PipelineConfig::default(),
            heuristics_file: None,
            sources: Vec::new(),
        }
    }
}

impl Default for MetroConfig {
    fn default() -> Self {
        Self {
            city: "Cambridge".to_string(),
            state: "MA".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_past_days: 30,
            max_future_days: 730,
            title_similarity_threshold: 0.85,
            venue_similarity_threshold: 0.70,
            max_start_delta_secs: 3600,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            AggregatorError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
