use alloy_primitives::{Address, B256, U256};
use bridge_queue::QueueError;

/// An error returned by a messenger operation. Any error means the operation must be treated
/// as a full rollback by the call-dispatch harness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessengerError {
    /// The operation was invoked while another cross-domain operation was in flight.
    #[error("reentrant messenger call")]
    ReentrantCall,
    /// The attached value does not cover the fee plus the message value.
    #[error("insufficient value: required {required}, provided {provided}")]
    InsufficientValue {
        /// The fee plus message value.
        required: U256,
        /// The value attached to the call.
        provided: U256,
    },
    /// The fee vault refused the fee transfer.
    #[error("fee vault {0} refused the fee transfer")]
    FeeVaultRejected(Address),
    /// The refund recipient refused the excess payment.
    #[error("refund to {0} failed")]
    RefundFailed(Address),
    /// A message with the same hash was already sent. Queue indices are injected into the
    /// payload, so this is a logic error rather than a user mistake.
    #[error("duplicate message hash {0}")]
    DuplicateMessage(B256),
    /// The message was already executed on this chain.
    #[error("message {0} was already executed")]
    AlreadyExecuted(B256),
    /// The batch referenced by the relay proof is not finalized.
    #[error("batch {0} is not finalized")]
    BatchNotFinalized(u64),
    /// The merkle proof does not bind the message to the batch's withdraw root.
    #[error("invalid withdraw trie proof for message {0}")]
    InvalidMerkleProof(B256),
    /// The relay target is a protected internal address.
    #[error("forbidden relay target {0}")]
    ForbiddenTarget(Address),
    /// The message was never sent from this messenger.
    #[error("message {0} was not sent")]
    MessageNotSent(B256),
    /// The message was already dropped.
    #[error("message {0} was dropped")]
    MessageDropped(B256),
    /// The message reached its replay allowance.
    #[error("message replayed {times} times, maximum {max}")]
    MaxReplayTimesExceeded {
        /// The number of replays so far.
        times: u64,
        /// The configured maximum.
        max: u64,
    },
    /// The drop-refund callback on the original sender failed.
    #[error("drop refund callback on {0} failed")]
    DropCallbackFailed(Address),
    /// An error surfaced by the message queue.
    #[error(transparent)]
    Queue(#[from] QueueError),
}
