//! End-to-end fixture wiring the queue, messenger and rollup chain together with mock
//! collaborators, the way a deployment wires the real components.

use alloy_primitives::{address, b256, keccak256, Address, Bytes, B256, U256};
use bridge_chain::{BatchCommit, ChainError, Chunk, RollupChain};
use bridge_codec::{BatchHeader, BatchHeaderV0};
use bridge_messenger::{Messenger, MessengerConfig, MessengerError, RelayProof};
use bridge_primitives::test_utils::{MockBlobSource, MockGasOracle, MockHost, MockVerifier};
use bridge_queue::{MessageQueue, QueueConfig};

/// The messenger address.
pub const MESSENGER: Address = address!("1000000000000000000000000000000000000001");
/// The rollup chain address.
pub const CHAIN: Address = address!("1000000000000000000000000000000000000002");
/// The enforced-transaction gateway address.
pub const GATEWAY: Address = address!("1000000000000000000000000000000000000003");
/// The message queue address.
pub const QUEUE: Address = address!("1000000000000000000000000000000000000004");
/// The fee vault address.
pub const VAULT: Address = address!("1000000000000000000000000000000000000005");
/// The counterpart messenger on the other chain.
pub const COUNTERPART: Address = address!("2000000000000000000000000000000000000001");
/// A message sender.
pub const ALICE: Address = address!("7885bcbd5cecef1336b5300fb5186a12ddd8c478");
/// A message target.
pub const BOB: Address = address!("781e90f1c8fc4611c9b7497c3b47f99ef6969cbc");

/// The genesis state root the fixture seeds the chain with.
pub const GENESIS_STATE_ROOT: B256 = B256::repeat_byte(0x11);

/// A fully wired bridge core over mock collaborators.
#[derive(Debug)]
pub struct Bridge {
    /// The mock call environment.
    pub host: MockHost,
    /// The mock fee oracle.
    pub oracle: MockGasOracle,
    /// The message queue.
    pub queue: MessageQueue,
    /// The cross-domain messenger.
    pub messenger: Messenger,
    /// The rollup chain.
    pub chain: RollupChain<MockBlobSource, MockVerifier>,
    /// The encoded genesis batch header.
    pub genesis_header: Vec<u8>,
    /// The state root of the last finalized batch.
    pub state_root: B256,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    /// Returns a wired bridge with an imported genesis batch and an accepting verifier.
    pub fn new() -> Self {
        let queue = MessageQueue::new(QueueConfig {
            messenger: MESSENGER,
            rollup: CHAIN,
            enforced_gateway: GATEWAY,
            max_gas_limit: 10_000_000,
        });
        let messenger = Messenger::new(MessengerConfig {
            address: MESSENGER,
            counterpart: COUNTERPART,
            fee_vault: VAULT,
            forbidden_targets: vec![QUEUE, GATEWAY],
            max_replay_times: 3,
        });
        let mut chain = RollupChain::new(
            CHAIN,
            MockBlobSource {
                hash: Some(b256!("0122222222222222222222222222222222222222222222222222222222222222")),
            },
            MockVerifier::accepting(),
        );

        let genesis_header =
            BatchHeaderV0::new(0, 0, 0, 0, keccak256("genesis"), B256::ZERO, vec![]).encode();
        chain
            .import_genesis_batch(&genesis_header, GENESIS_STATE_ROOT)
            .expect("genesis import on a fresh chain");

        Self {
            host: MockHost::at_time(1_700_000_000),
            oracle: MockGasOracle::default(),
            queue,
            messenger,
            chain,
            genesis_header,
            state_root: GENESIS_STATE_ROOT,
        }
    }

    /// Sends a message from [`ALICE`] to [`BOB`] with exact fee payment.
    pub fn send(&mut self, value: U256, message: Bytes) -> Result<u64, MessengerError> {
        let gas_limit = 400_000;
        let fee = U256::from(gas_limit * 2);
        self.messenger.send(
            &mut self.host,
            &self.oracle,
            &mut self.queue,
            ALICE,
            BOB,
            value,
            message,
            gas_limit,
            fee + value,
            ALICE,
        )
    }

    /// Replays a previously sent message with a fresh gas limit.
    pub fn replay(
        &mut self,
        value: U256,
        nonce: u64,
        message: &Bytes,
    ) -> Result<u64, MessengerError> {
        let gas_limit = 500_000;
        self.messenger.replay(
            &mut self.host,
            &self.oracle,
            &mut self.queue,
            ALICE,
            BOB,
            value,
            nonce,
            message,
            gas_limit,
            U256::from(gas_limit * 2),
            ALICE,
        )
    }

    /// Drops a skipped, finalized message and its replay instances.
    pub fn drop_message(
        &mut self,
        value: U256,
        nonce: u64,
        message: &Bytes,
    ) -> Result<(), MessengerError> {
        self.messenger.drop_message(
            &mut self.host,
            &mut self.queue,
            ALICE,
            BOB,
            value,
            nonce,
            message,
        )
    }

    /// Relays an L2-originated message against a finalized batch's withdraw root.
    #[allow(clippy::too_many_arguments)]
    pub fn relay(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
        nonce: u64,
        message: &Bytes,
        proof: &RelayProof,
    ) -> Result<bool, MessengerError> {
        self.messenger.relay(&mut self.host, &self.chain, from, to, value, nonce, message, proof)
    }

    /// Commits a single-chunk V0 batch consuming `num_l1_messages` queued messages.
    pub fn commit(
        &mut self,
        parent_header: &[u8],
        num_l1_messages: u64,
        skipped: U256,
    ) -> Result<BatchHeader, ChainError> {
        let bitmap = if num_l1_messages > 0 { vec![skipped] } else { vec![] };
        self.chain.commit(
            &mut self.queue,
            BatchCommit {
                version: 0,
                parent_header,
                chunks: &[Chunk { num_l1_messages, l2_payload_hash: keccak256("l2 payload") }],
                skipped_bitmap: &bitmap,
                last_block_timestamp: 0,
                blob_data_proof: [B256::ZERO; 2],
            },
        )
    }

    /// Finalizes a committed batch, tracking the rolling state root.
    pub fn finalize(
        &mut self,
        header: &BatchHeader,
        withdraw_root: B256,
    ) -> Result<(), ChainError> {
        let post_state_root = keccak256(self.state_root);
        self.chain.finalize_with_proof(
            &mut self.queue,
            &header.encode(),
            self.state_root,
            post_state_root,
            withdraw_root,
            b"proof",
        )?;
        self.state_root = post_state_root;
        Ok(())
    }

    /// Finalizes a bundle ending at `last_header`, tracking the rolling state root.
    pub fn finalize_bundle(
        &mut self,
        last_header: &BatchHeader,
        withdraw_root: B256,
    ) -> Result<(), ChainError> {
        let post_state_root = keccak256(self.state_root);
        self.chain.finalize_bundle_with_proof(
            &mut self.queue,
            &last_header.encode(),
            post_state_root,
            withdraw_root,
            b"proof",
        )?;
        self.state_root = post_state_root;
        Ok(())
    }
}
