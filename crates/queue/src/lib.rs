//! The append-only, index-addressed log of cross-domain message commitments.
//!
//! The queue owns the pending and finalized frontiers and the skip/drop bitmaps. It holds no
//! business logic beyond queue bookkeeping: the messenger appends and drops, the rollup chain
//! consumes (pops), rewinds and finalizes. Frontier invariant, always:
//! `finalized_index <= pending_index <= queue length`.

pub use error::QueueError;
mod error;

mod metrics;
use metrics::QueueMetrics;

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};
use bridge_primitives::{
    apply_l1_to_l2_alias,
    constants::MAX_NUM_MESSAGES_PER_POP,
    events::{
        DequeueTransaction, DropTransaction, FinalizedDequeuedTransaction, QueueEvent,
        QueueTransaction, ResetDequeuedTransaction,
    },
    GasOracle, Host, L1Message,
};

/// The configuration for the [`MessageQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// The address of the messenger, the only caller allowed to append and drop.
    pub messenger: Address,
    /// The address of the rollup chain, the only caller allowed to pop, reset and finalize.
    pub rollup: Address,
    /// The address of the enforced-transaction gateway, the only caller allowed to append
    /// through the permissionless inclusion path.
    pub enforced_gateway: Address,
    /// The maximum gas limit a queued message may request.
    pub max_gas_limit: u64,
}

/// The cross-domain message queue.
pub struct MessageQueue {
    config: QueueConfig,
    /// The commitment hash of every appended message, indexed by queue index.
    messages: Vec<B256>,
    /// The first index not yet consumed by a committed batch.
    pending_index: u64,
    /// The first index not yet covered by a finalized batch.
    finalized_index: u64,
    /// The skip bitmap, bucketed by 256 indices.
    skipped: HashMap<u64, U256>,
    /// The drop bitmap, bucketed by 256 indices. A set bit implies the skip bit is set.
    dropped: HashMap<u64, U256>,
    events: Vec<QueueEvent>,
    metrics: QueueMetrics,
}

impl MessageQueue {
    /// Returns a new, empty [`MessageQueue`] for the provided configuration.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            messages: Vec::new(),
            pending_index: 0,
            finalized_index: 0,
            skipped: HashMap::new(),
            dropped: HashMap::new(),
            events: Vec::new(),
            metrics: QueueMetrics::default(),
        }
    }

    /// Returns the queue index the next appended message will receive.
    pub fn next_index(&self) -> u64 {
        self.messages.len() as u64
    }

    /// Returns the first index not yet consumed by a committed batch.
    pub const fn pending_index(&self) -> u64 {
        self.pending_index
    }

    /// Returns the first index not yet covered by a finalized batch.
    pub const fn finalized_index(&self) -> u64 {
        self.finalized_index
    }

    /// Returns the commitment hash stored at the provided queue index.
    pub fn message_hash(&self, index: u64) -> Option<B256> {
        self.messages.get(index as usize).copied()
    }

    /// Returns true if the message at the index was skipped by the batch that consumed it.
    /// Messages at or beyond the pending frontier are not skipped.
    pub fn is_skipped(&self, index: u64) -> bool {
        index < self.pending_index && bit(&self.skipped, index)
    }

    /// Returns true if the message at the index was dropped. Implies [`Self::is_skipped`].
    pub fn is_dropped(&self, index: u64) -> bool {
        bit(&self.dropped, index)
    }

    /// Appends a cross-domain message sent through the messenger.
    ///
    /// The recorded sender is the L2 alias of the caller-supplied sender so L2 execution can
    /// distinguish L1-triggered calls from genuine L2 accounts. Returns the assigned queue
    /// index.
    pub fn append<O: GasOracle>(
        &mut self,
        caller: Address,
        sender: Address,
        target: Address,
        value: U256,
        gas_limit: u64,
        data: Bytes,
        oracle: &O,
    ) -> Result<u64, QueueError> {
        if caller != self.config.messenger {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        self.validate_gas_limit(gas_limit, &data, oracle)?;

        Ok(self.queue_transaction(apply_l1_to_l2_alias(sender), target, value, gas_limit, data))
    }

    /// Appends an enforced transaction through the permissionless inclusion path.
    ///
    /// The declared sender must be an externally-owned account: a sender with deployed code
    /// could forge a contract identity on L2. The sender is recorded unaliased.
    pub fn append_enforced<O: GasOracle, H: Host>(
        &mut self,
        caller: Address,
        sender: Address,
        target: Address,
        value: U256,
        gas_limit: u64,
        data: Bytes,
        oracle: &O,
        host: &H,
    ) -> Result<u64, QueueError> {
        if caller != self.config.enforced_gateway {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        if host.has_code(sender) {
            return Err(QueueError::SenderHasCode(sender))
        }
        self.validate_gas_limit(gas_limit, &data, oracle)?;

        Ok(self.queue_transaction(sender, target, value, gas_limit, data))
    }

    /// Consumes `count` messages starting exactly at the pending frontier, marking the bits
    /// set in `skipped_bitmap` (masked to `count` bits) as skipped.
    pub fn pop(
        &mut self,
        caller: Address,
        start_index: u64,
        count: u64,
        skipped_bitmap: U256,
    ) -> Result<(), QueueError> {
        if caller != self.config.rollup {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        if count == 0 || count > MAX_NUM_MESSAGES_PER_POP {
            return Err(QueueError::InvalidPopCount(count))
        }
        if start_index != self.pending_index {
            return Err(QueueError::PopStartIndexMismatch {
                start_index,
                pending_index: self.pending_index,
            })
        }
        let queue_length = self.next_index();
        if start_index + count > queue_length {
            return Err(QueueError::PopExceedsQueue { start_index, count, queue_length })
        }

        let masked = mask_bitmap(skipped_bitmap, count);
        let bucket = start_index >> 8;
        let offset = (start_index & 0xff) as usize;
        *self.skipped.entry(bucket).or_default() |= masked << offset;
        if offset > 0 && offset as u64 + count > MAX_NUM_MESSAGES_PER_POP {
            *self.skipped.entry(bucket + 1).or_default() |= masked >> (256 - offset);
        }

        self.pending_index += count;
        self.metrics.messages_popped.increment(count);
        tracing::trace!(target: "bridge::queue", start_index, count, "popped messages");
        self.events.push(
            DequeueTransaction {
                startIndex: U256::from(start_index),
                count: U256::from(count),
                skippedBitmap: masked,
            }
            .into(),
        );

        Ok(())
    }

    /// Rewinds the pending frontier to `start_index` after a batch revert.
    ///
    /// No-op if `start_index` already is the frontier. Skip bits below the reset point are
    /// preserved, bits at or above it are cleared.
    pub fn reset_pending(&mut self, caller: Address, start_index: u64) -> Result<(), QueueError> {
        if caller != self.config.rollup {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        if start_index == self.pending_index {
            return Ok(())
        }
        if start_index < self.finalized_index || start_index > self.pending_index {
            return Err(QueueError::ResetOutOfBounds {
                start_index,
                finalized_index: self.finalized_index,
                pending_index: self.pending_index,
            })
        }

        let first_bucket = start_index >> 8;
        let last_bucket = (self.pending_index - 1) >> 8;
        let offset = (start_index & 0xff) as usize;
        if offset == 0 {
            self.skipped.remove(&first_bucket);
        } else if let Some(word) = self.skipped.get_mut(&first_bucket) {
            *word &= (U256::from(1) << offset) - U256::from(1);
        }
        for bucket in (first_bucket + 1)..=last_bucket {
            self.skipped.remove(&bucket);
        }

        self.pending_index = start_index;
        tracing::debug!(target: "bridge::queue", start_index, "reset pending frontier");
        self.events.push(ResetDequeuedTransaction { startIndex: U256::from(start_index) }.into());

        Ok(())
    }

    /// Advances the finalized frontier to `new_finalized_index`.
    ///
    /// No-op if equal to the current frontier; must otherwise strictly advance and stay at or
    /// below the pending frontier.
    pub fn finalize(&mut self, caller: Address, new_finalized_index: u64) -> Result<(), QueueError> {
        if caller != self.config.rollup {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        if new_finalized_index == self.finalized_index {
            return Ok(())
        }
        if new_finalized_index < self.finalized_index || new_finalized_index > self.pending_index {
            return Err(QueueError::FinalizeOutOfOrder {
                new_finalized_index,
                finalized_index: self.finalized_index,
                pending_index: self.pending_index,
            })
        }

        self.finalized_index = new_finalized_index;
        tracing::debug!(target: "bridge::queue", new_finalized_index, "advanced finalized frontier");
        self.events.push(
            FinalizedDequeuedTransaction { finalizedIndex: U256::from(new_finalized_index) }.into(),
        );

        Ok(())
    }

    /// Validates that the message at `index` can be dropped, without mutating anything.
    ///
    /// The message must be covered by a finalized batch, must have been skipped by the batch
    /// that consumed it, and must not have been dropped before.
    pub fn validate_drop(&self, caller: Address, index: u64) -> Result<(), QueueError> {
        if caller != self.config.messenger {
            return Err(QueueError::UnauthorizedCaller(caller))
        }
        if index >= self.finalized_index {
            return Err(QueueError::NotFinalized(index))
        }
        if !self.is_skipped(index) {
            return Err(QueueError::NotSkipped(index))
        }
        if self.is_dropped(index) {
            return Err(QueueError::AlreadyDropped(index))
        }
        Ok(())
    }

    /// Marks the message at `index` as dropped, after the [`Self::validate_drop`] checks.
    pub fn drop_message(&mut self, caller: Address, index: u64) -> Result<(), QueueError> {
        self.validate_drop(caller, index)?;

        *self.dropped.entry(index >> 8).or_default() |= U256::from(1) << ((index & 0xff) as usize);
        self.metrics.messages_dropped.increment(1);
        tracing::debug!(target: "bridge::queue", index, "dropped message");
        self.events.push(DropTransaction { index: U256::from(index) }.into());

        Ok(())
    }

    /// Drains and returns the events emitted so far.
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        core::mem::take(&mut self.events)
    }

    /// Validates a requested gas limit against the configured maximum and the oracle's
    /// intrinsic cost, without mutating anything.
    pub fn validate_gas_limit<O: GasOracle>(
        &self,
        gas_limit: u64,
        data: &[u8],
        oracle: &O,
    ) -> Result<(), QueueError> {
        if gas_limit > self.config.max_gas_limit {
            return Err(QueueError::GasLimitExceedsMax {
                gas_limit,
                max: self.config.max_gas_limit,
            })
        }
        let intrinsic = oracle.intrinsic_gas(data);
        if gas_limit < intrinsic {
            return Err(QueueError::GasLimitBelowIntrinsic { gas_limit, intrinsic })
        }
        Ok(())
    }

    fn queue_transaction(
        &mut self,
        sender: Address,
        target: Address,
        value: U256,
        gas_limit: u64,
        data: Bytes,
    ) -> u64 {
        let queue_index = self.next_index();
        let message =
            L1Message { queue_index, gas_limit, to: target, value, sender, input: data.clone() };
        self.messages.push(message.tx_hash());

        self.metrics.messages_appended.increment(1);
        tracing::trace!(target: "bridge::queue", queue_index, %sender, %target, "appended message");
        self.events.push(
            QueueTransaction {
                sender,
                target,
                value,
                queueIndex: queue_index,
                gasLimit: U256::from(gas_limit),
                data,
            }
            .into(),
        );

        queue_index
    }
}

impl core::fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("config", &self.config)
            .field("queue_length", &self.messages.len())
            .field("pending_index", &self.pending_index)
            .field("finalized_index", &self.finalized_index)
            .finish_non_exhaustive()
    }
}

fn bit(map: &HashMap<u64, U256>, index: u64) -> bool {
    map.get(&(index >> 8)).is_some_and(|word| word.bit((index & 0xff) as usize))
}

fn mask_bitmap(bitmap: U256, count: u64) -> U256 {
    if count < MAX_NUM_MESSAGES_PER_POP {
        bitmap & ((U256::from(1) << (count as usize)) - U256::from(1))
    } else {
        bitmap
    }
}
