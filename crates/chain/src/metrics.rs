use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::RollupChain`].
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_chain")]
pub(crate) struct ChainMetrics {
    /// The number of batches committed.
    pub(crate) batches_committed: Counter,
    /// The number of batches reverted.
    pub(crate) batches_reverted: Counter,
    /// The number of batches finalized.
    pub(crate) batches_finalized: Counter,
}
