use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::MessageQueue`].
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_queue")]
pub(crate) struct QueueMetrics {
    /// The number of messages appended to the queue.
    pub(crate) messages_appended: Counter,
    /// The number of messages consumed by committed batches.
    pub(crate) messages_popped: Counter,
    /// The number of messages dropped.
    pub(crate) messages_dropped: Counter,
}
