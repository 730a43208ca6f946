//! The rollup chain state machine: batch commit, revert and finalize.
//!
//! Batches are committed contiguously from an imported genesis batch, each linked to its
//! parent by header hash. Committing consumes queued cross-domain messages; finalizing a
//! proven batch (or bundle of batches) records its state and withdraw roots and advances the
//! queue's finalized frontier. Committed-but-unproven batches can be reverted from the tail,
//! rewinding the queue's pending frontier.

pub use error::ChainError;
mod error;

mod metrics;
use metrics::ChainMetrics;

use std::collections::HashMap;

use alloy_eips::eip4844::VERSIONED_HASH_VERSION_KZG;
use alloy_primitives::{keccak256, Address, B256, U256};
use bridge_codec::{BatchHeader, BatchHeaderV0, BatchHeaderV1, BatchHeaderV3, BatchHeaderV7};
use bridge_primitives::{
    constants::MAX_NUM_MESSAGES_PER_POP,
    events::{ChainEvent, CommitBatch, FinalizeBatch, RevertBatch},
    BlobSource, ProofVerifier, WithdrawRootProvider,
};
use bridge_queue::MessageQueue;

/// A chunk of L2 blocks inside a batch: the number of queued cross-domain messages it
/// includes and the hash of its L2 transaction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// The number of queued messages the chunk consumes.
    pub num_l1_messages: u64,
    /// The keccak256 hash of the chunk's L2 transaction payload.
    pub l2_payload_hash: B256,
}

/// The caller-supplied payload of a batch commit.
#[derive(Debug, Clone, Copy)]
pub struct BatchCommit<'a> {
    /// The batch version byte, selecting the header layout.
    pub version: u8,
    /// The encoded header of the parent batch, authenticated against the committed hash.
    pub parent_header: &'a [u8],
    /// The chunks of the batch, in order.
    pub chunks: &'a [Chunk],
    /// Which of the consumed messages were skipped, bit 0 = first consumed message. One
    /// 256-bit word per 256 consumed messages.
    pub skipped_bitmap: &'a [U256],
    /// The timestamp of the last block in the batch. Versions 3 through 6 only.
    pub last_block_timestamp: u64,
    /// The blob data proof (z, y). Versions 3 through 6 only.
    pub blob_data_proof: [B256; 2],
}

/// Computes the public input binding a proven state transition to its final batch.
pub fn public_input_hash(
    prev_state_root: B256,
    post_state_root: B256,
    withdraw_root: B256,
    batch_hash: B256,
) -> B256 {
    let mut buf = [0u8; 128];
    buf[..32].copy_from_slice(prev_state_root.as_slice());
    buf[32..64].copy_from_slice(post_state_root.as_slice());
    buf[64..96].copy_from_slice(withdraw_root.as_slice());
    buf[96..].copy_from_slice(batch_hash.as_slice());
    keccak256(buf)
}

/// The rollup chain.
pub struct RollupChain<B, V> {
    /// The identity used as the caller towards the message queue.
    address: Address,
    blob_source: B,
    verifier: V,
    /// The header hash of every committed batch, keyed by batch index.
    committed: HashMap<u64, B256>,
    finalized_state_roots: HashMap<u64, B256>,
    withdraw_roots: HashMap<u64, B256>,
    last_committed_index: u64,
    last_finalized_index: u64,
    events: Vec<ChainEvent>,
    metrics: ChainMetrics,
}

impl<B: BlobSource, V: ProofVerifier> RollupChain<B, V> {
    /// Returns a new [`RollupChain`] without a genesis batch.
    pub fn new(address: Address, blob_source: B, verifier: V) -> Self {
        Self {
            address,
            blob_source,
            verifier,
            committed: HashMap::new(),
            finalized_state_roots: HashMap::new(),
            withdraw_roots: HashMap::new(),
            last_committed_index: 0,
            last_finalized_index: 0,
            events: Vec::new(),
            metrics: ChainMetrics::default(),
        }
    }

    /// Returns the index of the last committed batch.
    pub const fn last_committed_index(&self) -> u64 {
        self.last_committed_index
    }

    /// Returns the index of the last finalized batch.
    pub const fn last_finalized_index(&self) -> u64 {
        self.last_finalized_index
    }

    /// Returns the committed header hash of the batch, if it is committed.
    pub fn committed_batch_hash(&self, batch_index: u64) -> Option<B256> {
        self.committed.get(&batch_index).copied()
    }

    /// Returns the finalized state root recorded for the batch, if any. Bundles record only
    /// their final batch's roots.
    pub fn finalized_state_root(&self, batch_index: u64) -> Option<B256> {
        self.finalized_state_roots.get(&batch_index).copied()
    }

    /// Drains and returns the events emitted so far.
    pub fn take_events(&mut self) -> Vec<ChainEvent> {
        core::mem::take(&mut self.events)
    }

    /// Imports the genesis batch, seeding the chain. One-shot.
    ///
    /// The header must be a V0 header at index zero with a zero parent hash and zero popped
    /// counters; the genesis state root must be non-zero.
    pub fn import_genesis_batch(
        &mut self,
        header_bytes: &[u8],
        state_root: B256,
    ) -> Result<(), ChainError> {
        if !self.committed.is_empty() {
            return Err(ChainError::GenesisAlreadyImported)
        }
        if state_root.is_zero() {
            return Err(ChainError::ZeroStateRoot)
        }

        let header = BatchHeader::decode(header_bytes)?;
        let BatchHeader::V0(ref genesis) = header else {
            return Err(ChainError::InvalidGenesisHeader)
        };
        if genesis.batch_index != 0 ||
            genesis.l1_message_popped != 0 ||
            genesis.total_l1_message_popped != 0 ||
            !genesis.parent_batch_hash.is_zero() ||
            genesis.data_hash.is_zero() ||
            !genesis.skipped_l1_message_bitmap.is_empty()
        {
            return Err(ChainError::InvalidGenesisHeader)
        }

        let batch_hash = header.hash_slow();
        self.committed.insert(0, batch_hash);
        self.finalized_state_roots.insert(0, state_root);

        tracing::info!(target: "bridge::chain", %batch_hash, "imported genesis batch");
        self.events.push(CommitBatch { batchIndex: U256::ZERO, batchHash: batch_hash }.into());
        self.events.push(
            FinalizeBatch {
                batchIndex: U256::ZERO,
                batchHash: batch_hash,
                stateRoot: state_root,
                withdrawRoot: B256::ZERO,
            }
            .into(),
        );

        Ok(())
    }

    /// Commits a batch on top of the committed tail, consuming the queued messages its
    /// chunks claim and marking the supplied bits as skipped. Returns the built header.
    pub fn commit(
        &mut self,
        queue: &mut MessageQueue,
        commit: BatchCommit<'_>,
    ) -> Result<BatchHeader, ChainError> {
        self.ensure_genesis()?;
        if commit.chunks.is_empty() {
            return Err(ChainError::EmptyBatch)
        }

        let parent = BatchHeader::decode(commit.parent_header)?;
        let parent_hash = self.authenticate(&parent)?;
        let batch_index = parent.batch_index() + 1;
        if parent.batch_index() != self.last_committed_index {
            return Err(ChainError::NotCommittedTail {
                batch_index,
                last_committed_index: self.last_committed_index,
            })
        }
        let total_popped_before = parent
            .total_l1_message_popped()
            .ok_or(ChainError::MissingPoppedCount(parent.version()))?;

        let (data_hash, num_messages) = self.chunk_data_hash(queue, commit.chunks)?;
        let expected_words = num_messages.div_ceil(MAX_NUM_MESSAGES_PER_POP) as usize;
        if commit.skipped_bitmap.len() != expected_words {
            return Err(ChainError::BitmapLengthMismatch {
                expected: expected_words,
                got: commit.skipped_bitmap.len(),
            })
        }

        let total_popped = total_popped_before + num_messages;
        let header = match commit.version {
            0 => BatchHeader::V0(BatchHeaderV0::new(
                commit.version,
                batch_index,
                num_messages,
                total_popped,
                data_hash,
                parent_hash,
                commit.skipped_bitmap.to_vec(),
            )),
            1..=2 => BatchHeader::V1(BatchHeaderV1::new(
                commit.version,
                batch_index,
                num_messages,
                total_popped,
                data_hash,
                self.checked_blob_hash()?,
                parent_hash,
                commit.skipped_bitmap.to_vec(),
            )),
            3..=6 => BatchHeader::V3(BatchHeaderV3::new(
                commit.version,
                batch_index,
                num_messages,
                total_popped,
                data_hash,
                self.checked_blob_hash()?,
                parent_hash,
                commit.last_block_timestamp,
                commit.blob_data_proof,
            )),
            v => return Err(ChainError::UnsupportedCommitVersion(v)),
        };

        // consume the claimed messages word by word, bits relative to the batch start.
        let start = queue.pending_index();
        for (word_index, word) in commit.skipped_bitmap.iter().enumerate() {
            let offset = word_index as u64 * MAX_NUM_MESSAGES_PER_POP;
            let count = (num_messages - offset).min(MAX_NUM_MESSAGES_PER_POP);
            queue.pop(self.address, start + offset, count, *word)?;
        }

        let batch_hash = header.hash_slow();
        self.committed.insert(batch_index, batch_hash);
        self.last_committed_index = batch_index;

        self.metrics.batches_committed.increment(1);
        tracing::debug!(target: "bridge::chain", batch_index, %batch_hash, num_messages, "committed batch");
        self.events
            .push(CommitBatch { batchIndex: U256::from(batch_index), batchHash: batch_hash }.into());

        Ok(header)
    }

    /// Reverts `count` committed, unfinalized batches from the tail, starting at the decoded
    /// header's index, and rewinds the queue's pending frontier to the parent's frontier.
    pub fn revert(
        &mut self,
        queue: &mut MessageQueue,
        header_bytes: &[u8],
        count: u64,
    ) -> Result<(), ChainError> {
        self.ensure_genesis()?;
        if count == 0 {
            return Err(ChainError::InvalidRevertCount)
        }

        let header = BatchHeader::decode(header_bytes)?;
        self.authenticate(&header)?;
        let batch_index = header.batch_index();
        if batch_index + count - 1 != self.last_committed_index {
            return Err(ChainError::NotCommittedTail {
                batch_index,
                last_committed_index: self.last_committed_index,
            })
        }
        if batch_index <= self.last_finalized_index {
            return Err(ChainError::RevertFinalizedBatch {
                batch_index,
                last_finalized_index: self.last_finalized_index,
            })
        }

        let popped = header
            .l1_message_popped()
            .ok_or(ChainError::MissingPoppedCount(header.version()))?;
        let total_popped = header
            .total_l1_message_popped()
            .ok_or(ChainError::MissingPoppedCount(header.version()))?;

        for index in batch_index..=self.last_committed_index {
            // every index up to the tail is committed, so the entry exists.
            if let Some(batch_hash) = self.committed.remove(&index) {
                tracing::debug!(target: "bridge::chain", batch_index = index, %batch_hash, "reverted batch");
                self.events.push(
                    RevertBatch { batchIndex: U256::from(index), batchHash: batch_hash }.into(),
                );
            }
        }
        queue.reset_pending(self.address, total_popped - popped)?;
        self.last_committed_index = batch_index - 1;
        self.metrics.batches_reverted.increment(count);

        Ok(())
    }

    /// Finalizes the committed batch directly after the finalized tail, verifying the proof
    /// over the claimed state transition and advancing the queue's finalized frontier.
    pub fn finalize_with_proof(
        &mut self,
        queue: &mut MessageQueue,
        header_bytes: &[u8],
        prev_state_root: B256,
        post_state_root: B256,
        withdraw_root: B256,
        proof: &[u8],
    ) -> Result<(), ChainError> {
        self.ensure_genesis()?;

        let header = BatchHeader::decode(header_bytes)?;
        let batch_hash = self.authenticate(&header)?;
        let batch_index = header.batch_index();
        if batch_index != self.last_finalized_index + 1 {
            return Err(ChainError::FinalizeOutOfOrder {
                batch_index,
                expected: self.last_finalized_index + 1,
            })
        }
        self.check_state_roots(Some(prev_state_root), post_state_root)?;
        let total_popped = header
            .total_l1_message_popped()
            .ok_or(ChainError::MissingPoppedCount(header.version()))?;

        let public_input =
            public_input_hash(prev_state_root, post_state_root, withdraw_root, batch_hash);
        if !self.verifier.verify(proof, public_input) {
            return Err(ChainError::ProofRejected(batch_index))
        }

        queue.finalize(self.address, total_popped)?;
        self.record_finalized(batch_index, batch_hash, post_state_root, withdraw_root, 1);

        Ok(())
    }

    /// Finalizes a bundle of committed batches ending at the decoded header, proven by one
    /// aggregate proof. Only the final batch's roots are recorded.
    pub fn finalize_bundle_with_proof(
        &mut self,
        queue: &mut MessageQueue,
        last_header_bytes: &[u8],
        post_state_root: B256,
        withdraw_root: B256,
        proof: &[u8],
    ) -> Result<(), ChainError> {
        self.ensure_genesis()?;

        let header = BatchHeader::decode(last_header_bytes)?;
        let batch_hash = self.authenticate(&header)?;
        let batch_index = header.batch_index();
        if batch_index <= self.last_finalized_index {
            return Err(ChainError::FinalizeOutOfOrder {
                batch_index,
                expected: self.last_finalized_index + 1,
            })
        }
        let prev_state_root = self.check_state_roots(None, post_state_root)?;
        let total_popped = header
            .total_l1_message_popped()
            .ok_or(ChainError::MissingPoppedCount(header.version()))?;

        let public_input =
            public_input_hash(prev_state_root, post_state_root, withdraw_root, batch_hash);
        if !self.verifier.verify(proof, public_input) {
            return Err(ChainError::ProofRejected(batch_index))
        }

        queue.finalize(self.address, total_popped)?;
        let finalized = batch_index - self.last_finalized_index;
        self.record_finalized(batch_index, batch_hash, post_state_root, withdraw_root, finalized);

        Ok(())
    }

    /// Commits a minimal V7 batch on top of the finalized tail and finalizes it in the same
    /// call. V7 headers carry no popped counters, so the caller supplies the queue frontier
    /// the proof attests to; the consumed messages are popped unskipped.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_and_finalize(
        &mut self,
        queue: &mut MessageQueue,
        version: u8,
        parent_header_bytes: &[u8],
        total_l1_messages_popped: u64,
        post_state_root: B256,
        withdraw_root: B256,
        proof: &[u8],
    ) -> Result<BatchHeader, ChainError> {
        self.ensure_genesis()?;
        if version != 7 {
            return Err(ChainError::UnsupportedCommitVersion(version))
        }

        let parent = BatchHeader::decode(parent_header_bytes)?;
        let parent_hash = self.authenticate(&parent)?;
        let batch_index = parent.batch_index() + 1;
        if parent.batch_index() != self.last_committed_index {
            return Err(ChainError::NotCommittedTail {
                batch_index,
                last_committed_index: self.last_committed_index,
            })
        }
        // the atomic path only extends the finalized tail.
        if parent.batch_index() != self.last_finalized_index {
            return Err(ChainError::FinalizeOutOfOrder {
                batch_index,
                expected: self.last_finalized_index + 1,
            })
        }
        let prev_state_root = self.check_state_roots(None, post_state_root)?;

        let header = BatchHeader::V7(BatchHeaderV7::new(
            version,
            batch_index,
            self.checked_blob_hash()?,
            parent_hash,
        ));
        let batch_hash = header.hash_slow();

        let public_input =
            public_input_hash(prev_state_root, post_state_root, withdraw_root, batch_hash);
        if !self.verifier.verify(proof, public_input) {
            return Err(ChainError::ProofRejected(batch_index))
        }

        while queue.pending_index() < total_l1_messages_popped {
            let pending = queue.pending_index();
            let count = (total_l1_messages_popped - pending).min(MAX_NUM_MESSAGES_PER_POP);
            queue.pop(self.address, pending, count, U256::ZERO)?;
        }
        queue.finalize(self.address, total_l1_messages_popped)?;

        self.committed.insert(batch_index, batch_hash);
        self.last_committed_index = batch_index;
        self.metrics.batches_committed.increment(1);
        self.events
            .push(CommitBatch { batchIndex: U256::from(batch_index), batchHash: batch_hash }.into());
        self.record_finalized(batch_index, batch_hash, post_state_root, withdraw_root, 1);

        Ok(header)
    }

    /// Returns the blob versioned hash attached to the current transaction, checking the
    /// EIP-4844 KZG version byte.
    fn checked_blob_hash(&self) -> Result<B256, ChainError> {
        let hash = self.blob_source.blob_versioned_hash().ok_or(ChainError::BlobUnavailable)?;
        if hash[0] != VERSIONED_HASH_VERSION_KZG {
            return Err(ChainError::InvalidBlobVersionedHash(hash))
        }
        Ok(hash)
    }

    fn ensure_genesis(&self) -> Result<(), ChainError> {
        if self.committed.is_empty() {
            return Err(ChainError::GenesisNotImported)
        }
        Ok(())
    }

    /// Checks the decoded header against the committed hash table and returns its hash.
    fn authenticate(&self, header: &BatchHeader) -> Result<B256, ChainError> {
        let batch_index = header.batch_index();
        let expected = self
            .committed
            .get(&batch_index)
            .copied()
            .ok_or(ChainError::UnknownBatch(batch_index))?;
        let got = header.hash_slow();
        if got != expected {
            return Err(ChainError::BatchHashMismatch { batch_index, expected, got })
        }
        Ok(got)
    }

    /// Validates the claimed state roots against the finalized tail and returns the state
    /// root the transition starts from.
    fn check_state_roots(
        &self,
        prev_state_root: Option<B256>,
        post_state_root: B256,
    ) -> Result<B256, ChainError> {
        if post_state_root.is_zero() {
            return Err(ChainError::ZeroStateRoot)
        }
        let expected = self
            .finalized_state_roots
            .get(&self.last_finalized_index)
            .copied()
            .unwrap_or_default();
        if let Some(got) = prev_state_root {
            if got != expected {
                return Err(ChainError::StateRootMismatch { expected, got })
            }
        }
        Ok(expected)
    }

    fn record_finalized(
        &mut self,
        batch_index: u64,
        batch_hash: B256,
        post_state_root: B256,
        withdraw_root: B256,
        count: u64,
    ) {
        self.finalized_state_roots.insert(batch_index, post_state_root);
        self.withdraw_roots.insert(batch_index, withdraw_root);
        self.last_finalized_index = batch_index;

        self.metrics.batches_finalized.increment(count);
        tracing::debug!(target: "bridge::chain", batch_index, %batch_hash, "finalized batch");
        self.events.push(
            FinalizeBatch {
                batchIndex: U256::from(batch_index),
                batchHash: batch_hash,
                stateRoot: post_state_root,
                withdrawRoot: withdraw_root,
            }
            .into(),
        );
    }

    /// Computes the batch data hash over the chunks: each chunk hashes the stored queue
    /// message hashes it consumes followed by its L2 payload hash, and the batch hashes the
    /// chunk hashes in order. Returns the data hash and the total message count.
    fn chunk_data_hash(
        &self,
        queue: &MessageQueue,
        chunks: &[Chunk],
    ) -> Result<(B256, u64), ChainError> {
        let mut next = queue.pending_index();
        let mut chunk_hashes = Vec::with_capacity(chunks.len() * 32);
        for chunk in chunks {
            let mut buf = Vec::with_capacity((chunk.num_l1_messages as usize + 1) * 32);
            for _ in 0..chunk.num_l1_messages {
                let hash = queue.message_hash(next).ok_or(ChainError::MessageOutOfRange {
                    index: next,
                    queue_length: queue.next_index(),
                })?;
                buf.extend_from_slice(hash.as_slice());
                next += 1;
            }
            buf.extend_from_slice(chunk.l2_payload_hash.as_slice());
            chunk_hashes.extend_from_slice(keccak256(&buf).as_slice());
        }
        Ok((keccak256(&chunk_hashes), next - queue.pending_index()))
    }
}

impl<B: BlobSource, V: ProofVerifier> WithdrawRootProvider for RollupChain<B, V> {
    fn is_batch_finalized(&self, batch_index: u64) -> bool {
        !self.committed.is_empty() && batch_index <= self.last_finalized_index
    }

    fn withdraw_root(&self, batch_index: u64) -> Option<B256> {
        self.withdraw_roots.get(&batch_index).copied()
    }
}

impl<B, V> core::fmt::Debug for RollupChain<B, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RollupChain")
            .field("address", &self.address)
            .field("last_committed_index", &self.last_committed_index)
            .field("last_finalized_index", &self.last_finalized_index)
            .finish_non_exhaustive()
    }
}
