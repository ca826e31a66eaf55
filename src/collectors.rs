use crate::domain::EventCandidate;
use crate::error::{AggregatorError, Result};
use crate::types::Collector;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Collector backed by a JSON dump of already-harvested candidates.
///
/// The per-site fetchers run out of process (some sources are unreachable
/// from CI and are harvested locally); their hand-off format is a flat JSON
/// array of candidates. Every candidate is stamped with the registered
/// source name so provenance stays consistent regardless of what the dump
/// claims.
pub struct JsonFileCollector {
    name: String,
    path: PathBuf,
}

impl JsonFileCollector {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl Collector for JsonFileCollector {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> Result<Vec<EventCandidate>> {
        let content = fs::read_to_string(&self.path).map_err(|e| AggregatorError::Collector {
            collector: self.name.clone(),
            message: format!("cannot read {}: {}", self.path.display(), e),
        })?;

        let mut candidates: Vec<EventCandidate> =
            serde_json::from_str(&content).map_err(|e| AggregatorError::Collector {
                collector: self.name.clone(),
                message: format!("cannot parse {}: {}", self.path.display(), e),
            })?;

        for candidate in &mut candidates {
            candidate.source_name = self.name.clone();
        }

        info!(
            source = %self.name,
            count = candidates.len(),
            "loaded harvested candidates"
        );
        Ok(candidates)
    }
}
