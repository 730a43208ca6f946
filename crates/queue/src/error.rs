use alloy_primitives::Address;

/// An error returned by a message queue operation. Any error means the operation made no
/// state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The caller is not authorized for the operation.
    #[error("caller {0} is not authorized")]
    UnauthorizedCaller(Address),
    /// The message gas limit exceeds the configured maximum.
    #[error("gas limit {gas_limit} exceeds maximum {max}")]
    GasLimitExceedsMax {
        /// The requested gas limit.
        gas_limit: u64,
        /// The configured maximum.
        max: u64,
    },
    /// The message gas limit does not cover the intrinsic cost of its calldata.
    #[error("gas limit {gas_limit} below intrinsic gas {intrinsic}")]
    GasLimitBelowIntrinsic {
        /// The requested gas limit.
        gas_limit: u64,
        /// The intrinsic gas cost.
        intrinsic: u64,
    },
    /// The enforced-transaction sender has deployed code. Only externally-owned accounts may
    /// use the permissionless inclusion path.
    #[error("enforced transaction sender {0} has deployed code")]
    SenderHasCode(Address),
    /// A pop did not start at the pending frontier.
    #[error("pop start index {start_index} does not match pending index {pending_index}")]
    PopStartIndexMismatch {
        /// The requested start index.
        start_index: u64,
        /// The current pending frontier.
        pending_index: u64,
    },
    /// The pop count is zero or exceeds one bitmap bucket.
    #[error("invalid pop count {0}, must be in 1..=256")]
    InvalidPopCount(u64),
    /// A pop reached past the end of the queue.
    #[error("pop of {count} messages at {start_index} exceeds queue length {queue_length}")]
    PopExceedsQueue {
        /// The requested start index.
        start_index: u64,
        /// The requested count.
        count: u64,
        /// The number of appended messages.
        queue_length: u64,
    },
    /// A pending-frontier reset was outside the legal window.
    #[error(
        "reset to {start_index} outside window: finalized {finalized_index}, pending {pending_index}"
    )]
    ResetOutOfBounds {
        /// The requested start index.
        start_index: u64,
        /// The current finalized frontier.
        finalized_index: u64,
        /// The current pending frontier.
        pending_index: u64,
    },
    /// A finalization did not strictly advance the frontier or overtook the pending frontier.
    #[error(
        "finalize to {new_finalized_index} out of order: finalized {finalized_index}, pending {pending_index}"
    )]
    FinalizeOutOfOrder {
        /// The requested finalized frontier.
        new_finalized_index: u64,
        /// The current finalized frontier.
        finalized_index: u64,
        /// The current pending frontier.
        pending_index: u64,
    },
    /// The message is not yet covered by a finalized batch.
    #[error("message {0} is not finalized")]
    NotFinalized(u64),
    /// The message was not skipped, so it cannot be dropped.
    #[error("message {0} is not skipped")]
    NotSkipped(u64),
    /// The message was already dropped.
    #[error("message {0} was already dropped")]
    AlreadyDropped(u64),
}
