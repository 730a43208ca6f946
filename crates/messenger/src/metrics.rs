use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the [`super::Messenger`].
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_messenger")]
pub(crate) struct MessengerMetrics {
    /// The number of messages sent.
    pub(crate) messages_sent: Counter,
    /// The number of messages relayed successfully.
    pub(crate) messages_relayed: Counter,
    /// The number of relay attempts whose target call failed.
    pub(crate) relays_failed: Counter,
    /// The number of messages replayed.
    pub(crate) messages_replayed: Counter,
    /// The number of messages dropped.
    pub(crate) messages_dropped: Counter,
}
