//! Events emitted by the bridge components.

use alloy_sol_types::sol;

sol! {
    /// A message was appended to the queue.
    #[derive(Debug, PartialEq, Eq)]
    event QueueTransaction(
        address indexed sender,
        address indexed target,
        uint256 value,
        uint64 queueIndex,
        uint256 gasLimit,
        bytes data
    );

    /// A contiguous range of queued messages was consumed by a committed batch.
    #[derive(Debug, PartialEq, Eq)]
    event DequeueTransaction(uint256 startIndex, uint256 count, uint256 skippedBitmap);

    /// The pending frontier was rewound after a batch revert.
    #[derive(Debug, PartialEq, Eq)]
    event ResetDequeuedTransaction(uint256 startIndex);

    /// The finalized frontier advanced.
    #[derive(Debug, PartialEq, Eq)]
    event FinalizedDequeuedTransaction(uint256 finalizedIndex);

    /// A skipped and finalized message was dropped.
    #[derive(Debug, PartialEq, Eq)]
    event DropTransaction(uint256 index);

    /// A cross-domain message was sent.
    #[derive(Debug, PartialEq, Eq)]
    event SentMessage(
        address indexed sender,
        address indexed target,
        uint256 value,
        uint256 messageNonce,
        uint256 gasLimit,
        bytes message
    );

    /// A cross-domain message was relayed successfully.
    #[derive(Debug, PartialEq, Eq)]
    event RelayedMessage(bytes32 indexed messageHash);

    /// A cross-domain message relay was attempted and failed.
    #[derive(Debug, PartialEq, Eq)]
    event FailedRelayedMessage(bytes32 indexed messageHash);

    /// A batch was committed.
    #[derive(Debug, PartialEq, Eq)]
    event CommitBatch(uint256 indexed batchIndex, bytes32 indexed batchHash);

    /// A committed batch was reverted before finalization.
    #[derive(Debug, PartialEq, Eq)]
    event RevertBatch(uint256 indexed batchIndex, bytes32 indexed batchHash);

    /// A batch was finalized, recording its state and withdraw roots.
    #[derive(Debug, PartialEq, Eq)]
    event FinalizeBatch(
        uint256 indexed batchIndex,
        bytes32 indexed batchHash,
        bytes32 stateRoot,
        bytes32 withdrawRoot
    );
}

/// An event emitted by the message queue.
#[derive(Debug, PartialEq, Eq, derive_more::From)]
pub enum QueueEvent {
    /// A message was appended.
    Queue(QueueTransaction),
    /// Messages were consumed by a batch.
    Dequeue(DequeueTransaction),
    /// The pending frontier was rewound.
    Reset(ResetDequeuedTransaction),
    /// The finalized frontier advanced.
    Finalized(FinalizedDequeuedTransaction),
    /// A message was dropped.
    Drop(DropTransaction),
}

/// An event emitted by the messenger.
#[derive(Debug, PartialEq, Eq, derive_more::From)]
pub enum MessengerEvent {
    /// A message was sent.
    Sent(SentMessage),
    /// A message was relayed.
    Relayed(RelayedMessage),
    /// A message relay failed.
    FailedRelay(FailedRelayedMessage),
}

/// An event emitted by the rollup chain.
#[derive(Debug, PartialEq, Eq, derive_more::From)]
pub enum ChainEvent {
    /// A batch was committed.
    Commit(CommitBatch),
    /// A batch was reverted.
    Revert(RevertBatch),
    /// A batch was finalized.
    Finalize(FinalizeBatch),
}
