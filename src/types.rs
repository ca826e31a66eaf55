use crate::domain::EventCandidate;
use crate::error::Result;

/// Contract implemented by every candidate source feeding the pipeline.
///
/// Collectors run strictly one at a time in registration order and are
/// dropped by the orchestrator as soon as their batch is in, because some
/// hold heavyweight external resources (headless browser processes in the
/// original deployment).
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Source name recorded on every candidate this collector produces.
    fn source_name(&self) -> &str;

    /// Produce all candidates currently available from this source.
    async fn collect(&self) -> Result<Vec<EventCandidate>>;
}
