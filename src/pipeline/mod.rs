pub mod dedupe;
pub mod enrich;
pub mod similarity;
pub mod validator;

use crate::domain::{EventCandidate, EventRecord};
use crate::error::Result;
use crate::storage::EventStore;
use crate::types::Collector;
use chrono::Utc;
use dedupe::Deduplicator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use validator::Validator;

/// Stages of one aggregation run. A run walks these strictly forward; there
/// is no resumable intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Idle,
    Collecting,
    Validating,
    Deduplicating,
    Finalizing,
    Persisted,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Idle => "idle",
            RunStage::Collecting => "collecting",
            RunStage::Validating => "validating",
            RunStage::Deduplicating => "deduplicating",
            RunStage::Finalizing => "finalizing",
            RunStage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Result of a complete aggregation run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub collected: usize,
    pub rejected: usize,
    pub unique: usize,
    pub preserved: usize,
    pub persisted: usize,
    pub collector_errors: Vec<String>,
}

/// Sequences collection, validation, deduplication, identity assignment,
/// and the persistence merge for one run.
///
/// The collector roster is an explicit ordered list handed in at
/// construction; collectors run one at a time and each is dropped as soon
/// as its batch is in, so at most one source's heavyweight resources are
/// alive at any moment. `run` consumes the roster: one orchestrator, one
/// run.
pub struct Orchestrator {
    collectors: Vec<Box<dyn Collector>>,
    skipped_sources: Vec<String>,
    validator: Validator,
    deduplicator: Deduplicator,
    store: Arc<dyn EventStore>,
    stage: RunStage,
}

impl Orchestrator {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        skipped_sources: Vec<String>,
        validator: Validator,
        deduplicator: Deduplicator,
        store: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            collectors,
            skipped_sources,
            validator,
            deduplicator,
            store,
            stage: RunStage::Idle,
        }
    }

    fn advance(&mut self, next: RunStage) {
        info!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub async fn run(&mut self) -> Result<RunSummary> {
        self.advance(RunStage::Collecting);
        let (candidates, collector_errors) = self.collect_all().await;
        let collected = candidates.len();
        info!(collected, "collection finished");

        self.advance(RunStage::Validating);
        let (accepted, rejected) = self.validate_all(candidates);
        info!(accepted = accepted.len(), rejected, "validation finished");

        self.advance(RunStage::Deduplicating);
        let unique = self.deduplicator.deduplicate(accepted);
        info!(unique = unique.len(), "deduplication finished");

        self.advance(RunStage::Finalizing);
        let now = Utc::now();
        let mut records: Vec<EventRecord> = unique
            .into_iter()
            .map(|candidate| EventRecord::finalize(candidate, now))
            .collect();
        let unique_count = records.len();

        let preserved = self.preserved_records().await;
        let preserved_count = preserved.len();
        records.extend(preserved);

        self.store.save(&records).await?;
        self.advance(RunStage::Persisted);
        info!(
            new = unique_count,
            preserved = preserved_count,
            total = records.len(),
            "run persisted"
        );

        Ok(RunSummary {
            collected,
            rejected,
            unique: unique_count,
            preserved: preserved_count,
            persisted: records.len(),
            collector_errors,
        })
    }

    /// Run every collector in registration order. A failing source is
    /// logged and contributes nothing; the run continues.
    async fn collect_all(&mut self) -> (Vec<EventCandidate>, Vec<String>) {
        let mut candidates = Vec::new();
        let mut errors = Vec::new();

        for collector in std::mem::take(&mut self.collectors) {
            let source = collector.source_name().to_string();
            match collector.collect().await {
                Ok(batch) => {
                    info!(source = %source, count = batch.len(), "collected candidates");
                    candidates.extend(batch);
                }
                Err(e) => {
                    error!(source = %source, error = %e, "collector failed, continuing");
                    errors.push(format!("{source}: {e}"));
                }
            }
            // Release this source's resources before the next one starts
            drop(collector);
            debug!(source = %source, "collector released");
        }

        (candidates, errors)
    }

    fn validate_all(&self, candidates: Vec<EventCandidate>) -> (Vec<EventCandidate>, usize) {
        let mut accepted = Vec::with_capacity(candidates.len());
        let mut rejected = 0;

        for mut candidate in candidates {
            self.validator.clean_and_enhance(&mut candidate);
            match self.validator.validate(&candidate) {
                Ok(()) => accepted.push(candidate),
                Err(reason) => {
                    warn!(
                        title = %candidate.title,
                        source = %candidate.source_name,
                        %reason,
                        "rejected candidate"
                    );
                    rejected += 1;
                }
            }
        }

        (accepted, rejected)
    }

    /// Last-known-good records for sources intentionally skipped this run.
    /// A missing or unreadable prior store means nothing to preserve.
    async fn preserved_records(&self) -> Vec<EventRecord> {
        if self.skipped_sources.is_empty() {
            return Vec::new();
        }

        match self.store.load().await {
            Ok(prior) => {
                let preserved: Vec<EventRecord> = prior
                    .into_iter()
                    .filter(|record| {
                        self.skipped_sources
                            .iter()
                            .any(|source| source == &record.event.source_name)
                    })
                    .collect();
                info!(
                    count = preserved.len(),
                    sources = ?self.skipped_sources,
                    "preserving records from skipped sources"
                );
                preserved
            }
            Err(e) => {
                warn!(error = %e, "could not load prior store, nothing to preserve");
                Vec::new()
            }
        }
    }
}
