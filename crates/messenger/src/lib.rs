//! The cross-domain messenger: sends, relays, replays and drops individual messages.
//!
//! The messenger owns the per-message bookkeeping (send timestamps, executed set, replay
//! chains, dropped set) and the scoped cross-domain execution context. Queue consumption and
//! finalization belong to the rollup chain; the messenger only appends, reads drop
//! eligibility, and drops.

pub use error::MessengerError;
mod error;

pub use replay::ReplayState;
mod replay;
use replay::ReplayChains;

pub use withdraw_trie::verify_merkle_proof;
mod withdraw_trie;
#[cfg(any(test, feature = "test-utils"))]
pub use withdraw_trie::test_utils::build_withdraw_trie;

mod metrics;
use metrics::MessengerMetrics;

use std::collections::{BTreeSet, HashMap, HashSet};

use alloy_primitives::{Address, Bytes, B256, U256};
use bridge_primitives::{
    abi::{encode_drop_callback, encode_relay_payload, relay_payload_hash},
    constants::{DEFAULT_XDOMAIN_MESSAGE_SENDER, DROP_XDOMAIN_MESSAGE_SENDER},
    events::{FailedRelayedMessage, MessengerEvent, RelayedMessage, SentMessage},
    GasOracle, Host, WithdrawRootProvider,
};
use bridge_queue::MessageQueue;

/// The cross-domain execution context of the messenger.
///
/// Doubles as the reentrancy guard: every operation requires [`XDomainContext::NotEntered`]
/// on entry and restores it on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XDomainContext {
    /// No cross-domain operation is in flight.
    #[default]
    NotEntered,
    /// A send is in flight.
    Send,
    /// A relay is in flight on behalf of the cross-domain sender.
    Relay(Address),
    /// A replay is in flight.
    Replay,
    /// A drop-refund callback is in flight.
    Drop,
}

/// A proof that a message is included in a finalized batch's withdraw trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayProof {
    /// The index of the finalized batch whose withdraw root covers the message.
    pub batch_index: u64,
    /// The sibling hashes from the message leaf up to the withdraw root.
    pub merkle_proof: Vec<B256>,
}

/// The configuration for the [`Messenger`].
#[derive(Debug, Clone)]
pub struct MessengerConfig {
    /// The address of this messenger. Used as the caller identity towards the queue and as a
    /// forbidden relay target.
    pub address: Address,
    /// The counterpart messenger on the other chain, the queue target of sent messages.
    pub counterpart: Address,
    /// The vault receiving message fees.
    pub fee_vault: Address,
    /// Privileged entry points a relayed call may never target, e.g. the message queue and
    /// the enforced-transaction gateway.
    pub forbidden_targets: Vec<Address>,
    /// The maximum number of times a message may be replayed.
    pub max_replay_times: u64,
}

/// The cross-domain messenger.
pub struct Messenger {
    config: MessengerConfig,
    forbidden_targets: BTreeSet<Address>,
    /// The timestamp at which each message hash was sent.
    send_timestamp: HashMap<B256, u64>,
    /// Message hashes executed on this chain.
    executed: HashSet<B256>,
    /// Message hashes dropped on this chain.
    dropped: HashSet<B256>,
    replay_chains: ReplayChains,
    context: XDomainContext,
    events: Vec<MessengerEvent>,
    metrics: MessengerMetrics,
}

impl Messenger {
    /// Returns a new [`Messenger`] for the provided configuration.
    pub fn new(config: MessengerConfig) -> Self {
        let mut forbidden_targets: BTreeSet<_> =
            config.forbidden_targets.iter().copied().collect();
        forbidden_targets.insert(config.address);

        Self {
            config,
            forbidden_targets,
            send_timestamp: HashMap::new(),
            executed: HashSet::new(),
            dropped: HashSet::new(),
            replay_chains: ReplayChains::default(),
            context: XDomainContext::NotEntered,
            events: Vec::new(),
            metrics: MessengerMetrics::default(),
        }
    }

    /// Returns the effective cross-domain sender for the current execution context.
    ///
    /// During a relay this is the sender on the originating chain; during a drop-refund
    /// callback it is a distinct sentinel so callees can tell the two apart.
    pub const fn xdomain_message_sender(&self) -> Address {
        match self.context {
            XDomainContext::Relay(sender) => sender,
            XDomainContext::Drop => DROP_XDOMAIN_MESSAGE_SENDER,
            _ => DEFAULT_XDOMAIN_MESSAGE_SENDER,
        }
    }

    /// Returns the timestamp the message hash was sent at, if it was sent from this chain.
    pub fn send_timestamp(&self, message_hash: &B256) -> Option<u64> {
        self.send_timestamp.get(message_hash).copied()
    }

    /// Returns true if the message hash was executed on this chain.
    pub fn is_executed(&self, message_hash: &B256) -> bool {
        self.executed.contains(message_hash)
    }

    /// Returns true if the message hash was dropped.
    pub fn is_dropped(&self, message_hash: &B256) -> bool {
        self.dropped.contains(message_hash)
    }

    /// Returns the replay state of the message hash, if it was ever replayed.
    pub fn replay_state(&self, message_hash: &B256) -> Option<ReplayState> {
        self.replay_chains.state(message_hash)
    }

    /// Returns the predecessor queue index of a replay instance, if any.
    pub fn prev_replay_index(&self, index: u64) -> Option<u64> {
        self.replay_chains.prev(index)
    }

    /// Drains and returns the events emitted so far.
    pub fn take_events(&mut self) -> Vec<MessengerEvent> {
        core::mem::take(&mut self.events)
    }

    /// Sends a cross-domain message, enqueueing it for execution on the counterpart chain.
    ///
    /// `msg_value` must cover the oracle fee plus the message value; the fee goes to the fee
    /// vault and the excess back to `refund_address`. Returns the message nonce (its queue
    /// index).
    #[allow(clippy::too_many_arguments)]
    pub fn send<H: Host, O: GasOracle>(
        &mut self,
        host: &mut H,
        oracle: &O,
        queue: &mut MessageQueue,
        sender: Address,
        to: Address,
        value: U256,
        message: Bytes,
        gas_limit: u64,
        msg_value: U256,
        refund_address: Address,
    ) -> Result<u64, MessengerError> {
        self.enter(XDomainContext::Send)?;
        let result = self.send_inner(
            host,
            oracle,
            queue,
            sender,
            to,
            value,
            message,
            gas_limit,
            msg_value,
            refund_address,
        );
        self.context = XDomainContext::NotEntered;
        result
    }

    /// Relays an L2-originated message on this chain, authorized by an inclusion proof
    /// against a finalized batch's withdraw root.
    ///
    /// A failed target call does not error: the failure is recorded and the message stays
    /// eligible for another relay attempt. Returns whether the message executed.
    #[allow(clippy::too_many_arguments)]
    pub fn relay<H: Host, R: WithdrawRootProvider>(
        &mut self,
        host: &mut H,
        roots: &R,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
        proof: &RelayProof,
    ) -> Result<bool, MessengerError> {
        self.enter(XDomainContext::Relay(from))?;
        let result = self.relay_inner(host, roots, from, to, value, nonce, message, proof);
        self.context = XDomainContext::NotEntered;
        result
    }

    /// Re-enqueues a previously sent message with a new gas limit, extending its replay
    /// chain. Returns the fresh queue index.
    ///
    /// Replaying does not invalidate the original: the destination chain treats only the
    /// first successful execution of the logical payload as authoritative.
    #[allow(clippy::too_many_arguments)]
    pub fn replay<H: Host, O: GasOracle>(
        &mut self,
        host: &mut H,
        oracle: &O,
        queue: &mut MessageQueue,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
        new_gas_limit: u64,
        msg_value: U256,
        refund_address: Address,
    ) -> Result<u64, MessengerError> {
        self.enter(XDomainContext::Replay)?;
        let result = self.replay_inner(
            host,
            oracle,
            queue,
            from,
            to,
            value,
            nonce,
            message,
            new_gas_limit,
            msg_value,
            refund_address,
        );
        self.context = XDomainContext::NotEntered;
        result
    }

    /// Drops a skipped, finalized message and refunds the sender through the
    /// `onDropMessage` callback.
    ///
    /// Every instance on the message's replay chain must be skipped and finalized; the walk
    /// visits them all, from the most recent replay back to the original index.
    pub fn drop_message<H: Host>(
        &mut self,
        host: &mut H,
        queue: &mut MessageQueue,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
    ) -> Result<(), MessengerError> {
        self.enter(XDomainContext::Drop)?;
        let result = self.drop_inner(host, queue, from, to, value, nonce, message);
        self.context = XDomainContext::NotEntered;
        result
    }

    fn enter(&mut self, context: XDomainContext) -> Result<(), MessengerError> {
        if self.context != XDomainContext::NotEntered {
            return Err(MessengerError::ReentrantCall)
        }
        self.context = context;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn send_inner<H: Host, O: GasOracle>(
        &mut self,
        host: &mut H,
        oracle: &O,
        queue: &mut MessageQueue,
        sender: Address,
        to: Address,
        value: U256,
        message: Bytes,
        gas_limit: u64,
        msg_value: U256,
        refund_address: Address,
    ) -> Result<u64, MessengerError> {
        let fee = oracle.estimate_fee(gas_limit);
        let required = fee + value;
        if msg_value < required {
            return Err(MessengerError::InsufficientValue { required, provided: msg_value })
        }

        // the nonce is injected into the payload, so the hash is unique per send.
        let nonce = queue.next_index();
        let payload = encode_relay_payload(sender, to, value, U256::from(nonce), &message);
        let message_hash = alloy_primitives::keccak256(&payload);
        if self.send_timestamp.contains_key(&message_hash) {
            return Err(MessengerError::DuplicateMessage(message_hash))
        }
        // the gas limit is validated before any value moves, so a rejected send leaves the
        // fee vault and the refund address untouched.
        queue.validate_gas_limit(gas_limit, &payload, oracle)?;

        if fee > U256::ZERO && !host.transfer(self.config.fee_vault, fee) {
            return Err(MessengerError::FeeVaultRejected(self.config.fee_vault))
        }
        let refund = msg_value - fee - value;
        if refund > U256::ZERO && !host.transfer(refund_address, refund) {
            return Err(MessengerError::RefundFailed(refund_address))
        }

        queue.append(
            self.config.address,
            self.config.address,
            self.config.counterpart,
            U256::ZERO,
            gas_limit,
            payload,
            oracle,
        )?;
        self.send_timestamp.insert(message_hash, host.timestamp());

        self.metrics.messages_sent.increment(1);
        tracing::debug!(target: "bridge::messenger", %message_hash, nonce, "sent message");
        self.events.push(
            SentMessage {
                sender,
                target: to,
                value,
                messageNonce: U256::from(nonce),
                gasLimit: U256::from(gas_limit),
                message,
            }
            .into(),
        );

        Ok(nonce)
    }

    #[allow(clippy::too_many_arguments)]
    fn relay_inner<H: Host, R: WithdrawRootProvider>(
        &mut self,
        host: &mut H,
        roots: &R,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
        proof: &RelayProof,
    ) -> Result<bool, MessengerError> {
        let message_hash = relay_payload_hash(from, to, value, U256::from(nonce), message);
        if self.executed.contains(&message_hash) {
            return Err(MessengerError::AlreadyExecuted(message_hash))
        }

        if !roots.is_batch_finalized(proof.batch_index) {
            return Err(MessengerError::BatchNotFinalized(proof.batch_index))
        }
        let withdraw_root = roots
            .withdraw_root(proof.batch_index)
            .ok_or(MessengerError::BatchNotFinalized(proof.batch_index))?;
        if !verify_merkle_proof(withdraw_root, message_hash, nonce, &proof.merkle_proof) {
            return Err(MessengerError::InvalidMerkleProof(message_hash))
        }

        // a relayed call may never re-enter trusted internals.
        if self.forbidden_targets.contains(&to) {
            return Err(MessengerError::ForbiddenTarget(to))
        }

        if host.call(to, value, message) {
            self.executed.insert(message_hash);
            self.metrics.messages_relayed.increment(1);
            tracing::debug!(target: "bridge::messenger", %message_hash, "relayed message");
            self.events.push(RelayedMessage { messageHash: message_hash }.into());
            Ok(true)
        } else {
            // the relay transaction itself does not fail: the message can be replayed.
            self.metrics.relays_failed.increment(1);
            tracing::debug!(target: "bridge::messenger", %message_hash, "relay call failed");
            self.events.push(FailedRelayedMessage { messageHash: message_hash }.into());
            Ok(false)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn replay_inner<H: Host, O: GasOracle>(
        &mut self,
        host: &mut H,
        oracle: &O,
        queue: &mut MessageQueue,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
        new_gas_limit: u64,
        msg_value: U256,
        refund_address: Address,
    ) -> Result<u64, MessengerError> {
        let payload = encode_relay_payload(from, to, value, U256::from(nonce), message);
        let message_hash = alloy_primitives::keccak256(&payload);
        if !self.send_timestamp.contains_key(&message_hash) {
            return Err(MessengerError::MessageNotSent(message_hash))
        }
        if self.dropped.contains(&message_hash) {
            return Err(MessengerError::MessageDropped(message_hash))
        }

        let times = self.replay_chains.state(&message_hash).map_or(0, |state| state.times);
        if times >= self.config.max_replay_times {
            return Err(MessengerError::MaxReplayTimesExceeded {
                times,
                max: self.config.max_replay_times,
            })
        }

        let fee = oracle.estimate_fee(new_gas_limit);
        if msg_value < fee {
            return Err(MessengerError::InsufficientValue { required: fee, provided: msg_value })
        }
        queue.validate_gas_limit(new_gas_limit, &payload, oracle)?;

        if fee > U256::ZERO && !host.transfer(self.config.fee_vault, fee) {
            return Err(MessengerError::FeeVaultRejected(self.config.fee_vault))
        }
        let refund = msg_value - fee;
        if refund > U256::ZERO && !host.transfer(refund_address, refund) {
            return Err(MessengerError::RefundFailed(refund_address))
        }

        // same logical payload, fresh queue index.
        let new_index = queue.append(
            self.config.address,
            self.config.address,
            self.config.counterpart,
            U256::ZERO,
            new_gas_limit,
            payload,
            oracle,
        )?;
        self.replay_chains.link(message_hash, nonce, new_index);

        self.metrics.messages_replayed.increment(1);
        tracing::debug!(target: "bridge::messenger", %message_hash, new_index, "replayed message");

        Ok(new_index)
    }

    fn drop_inner<H: Host>(
        &mut self,
        host: &mut H,
        queue: &mut MessageQueue,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
    ) -> Result<(), MessengerError> {
        let message_hash = relay_payload_hash(from, to, value, U256::from(nonce), message);
        if !self.send_timestamp.contains_key(&message_hash) {
            return Err(MessengerError::MessageNotSent(message_hash))
        }
        if self.dropped.contains(&message_hash) {
            return Err(MessengerError::MessageDropped(message_hash))
        }

        // every replay instance must be skipped and finalized for the drop to go through.
        // all instances are validated read-only up front: a failure on any of them leaves
        // the whole chain undropped.
        let chain = self.replay_chains.walk(&message_hash, nonce);
        for index in &chain {
            queue.validate_drop(self.config.address, *index)?;
        }

        // nothing is recorded until the refund callback succeeds, so a failed callback
        // keeps the message droppable.
        if !host.call(from, value, &encode_drop_callback(message)) {
            return Err(MessengerError::DropCallbackFailed(from))
        }

        for index in chain {
            queue.drop_message(self.config.address, index)?;
        }
        self.dropped.insert(message_hash);

        self.metrics.messages_dropped.increment(1);
        tracing::debug!(target: "bridge::messenger", %message_hash, "dropped message");

        Ok(())
    }
}

impl core::fmt::Debug for Messenger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Messenger")
            .field("config", &self.config)
            .field("context", &self.context)
            .field("sent", &self.send_timestamp.len())
            .field("executed", &self.executed.len())
            .field("dropped", &self.dropped.len())
            .finish_non_exhaustive()
    }
}
