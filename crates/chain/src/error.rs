use alloy_primitives::B256;
use bridge_codec::CodecError;
use bridge_queue::QueueError;

/// An error returned by a rollup chain operation. Any error means the operation must be
/// treated as a full rollback by the call-dispatch harness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The genesis batch was already imported.
    #[error("genesis batch already imported")]
    GenesisAlreadyImported,
    /// No genesis batch was imported yet.
    #[error("genesis batch not imported")]
    GenesisNotImported,
    /// The genesis header is not a V0 header at index zero with zero parent and counters.
    #[error("invalid genesis batch header")]
    InvalidGenesisHeader,
    /// The batch version cannot be committed through this entry point.
    #[error("unsupported commit version {0}")]
    UnsupportedCommitVersion(u8),
    /// The header version does not track popped-message counters.
    #[error("header version {0} carries no popped-message counters")]
    MissingPoppedCount(u8),
    /// The batch contains no chunks.
    #[error("batch contains no chunks")]
    EmptyBatch,
    /// No batch with the provided index was committed.
    #[error("unknown batch {0}")]
    UnknownBatch(u64),
    /// The provided header does not hash to the committed batch hash.
    #[error("batch {batch_index} hash mismatch: committed {expected}, provided {got}")]
    BatchHashMismatch {
        /// The index of the batch.
        batch_index: u64,
        /// The committed hash.
        expected: B256,
        /// The hash of the provided header.
        got: B256,
    },
    /// The operation does not start at the committed tail.
    #[error("batch {batch_index} does not extend the committed tail {last_committed_index}")]
    NotCommittedTail {
        /// The index of the batch.
        batch_index: u64,
        /// The index of the last committed batch.
        last_committed_index: u64,
    },
    /// The blob source reports no versioned hash for a blob-carrying version.
    #[error("no blob versioned hash available")]
    BlobUnavailable,
    /// The blob versioned hash does not carry the KZG version byte.
    #[error("invalid blob versioned hash {0}")]
    InvalidBlobVersionedHash(B256),
    /// The skipped bitmap does not cover the claimed message count.
    #[error("skipped bitmap length mismatch: expected {expected} words, got {got}")]
    BitmapLengthMismatch {
        /// The number of 256-bit words required.
        expected: usize,
        /// The number of words provided.
        got: usize,
    },
    /// A chunk claims a queue index beyond the appended messages.
    #[error("chunk references queue index {index} beyond queue length {queue_length}")]
    MessageOutOfRange {
        /// The first out-of-range index.
        index: u64,
        /// The number of appended messages.
        queue_length: u64,
    },
    /// A revert must unwind at least one batch.
    #[error("revert count must be at least one")]
    InvalidRevertCount,
    /// The revert targets a finalized batch.
    #[error("batch {batch_index} is finalized up to {last_finalized_index}, cannot revert")]
    RevertFinalizedBatch {
        /// The first index targeted by the revert.
        batch_index: u64,
        /// The index of the last finalized batch.
        last_finalized_index: u64,
    },
    /// Batches must finalize in strictly increasing order.
    #[error("cannot finalize batch {batch_index}, expected {expected}")]
    FinalizeOutOfOrder {
        /// The index of the batch.
        batch_index: u64,
        /// The next index eligible for finalization.
        expected: u64,
    },
    /// The post state root of a finalized batch must be non-zero.
    #[error("zero post state root")]
    ZeroStateRoot,
    /// The claimed previous state root does not match the last finalized state root.
    #[error("previous state root mismatch: finalized {expected}, provided {got}")]
    StateRootMismatch {
        /// The last finalized state root.
        expected: B256,
        /// The state root provided by the caller.
        got: B256,
    },
    /// The proof verifier rejected the proof.
    #[error("proof rejected for batch {0}")]
    ProofRejected(u64),
    /// An error surfaced by the batch header codec.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// An error surfaced by the message queue.
    #[error(transparent)]
    Queue(#[from] QueueError),
}
