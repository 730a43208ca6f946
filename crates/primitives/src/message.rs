use crate::constants::L1_MESSAGE_TX_TYPE;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};

/// A cross-domain message recorded in the L1 message queue.
///
/// The message is identified by its `queue_index`, assigned monotonically at enqueue time,
/// and by the hash of its canonical typed-transaction encoding, see [`L1Message::tx_hash`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct L1Message {
    /// The queue index of the message.
    pub queue_index: u64,
    /// The gas limit for executing the message on L2.
    pub gas_limit: u64,
    /// The target address on L2.
    pub to: Address,
    /// The value carried by the message.
    pub value: U256,
    /// The sender recorded for the message. L1-originated senders are aliased before being
    /// stored, see [`crate::apply_l1_to_l2_alias`].
    pub sender: Address,
    /// The calldata of the message.
    pub input: Bytes,
}

impl L1Message {
    /// Computes the canonical transaction hash for the message.
    ///
    /// The encoding is the typed-transaction preamble byte followed by the RLP list
    /// `[queue_index, gas_limit, to, value, input, sender]`, hashed with keccak256. This must
    /// reproduce the L2 execution client's encoding byte for byte: any deviation breaks
    /// cross-chain agreement on message identity.
    pub fn tx_hash(&self) -> B256 {
        let mut fields = Vec::new();
        self.queue_index.encode(&mut fields);
        self.gas_limit.encode(&mut fields);
        self.to.encode(&mut fields);
        self.value.encode(&mut fields);
        self.input.encode(&mut fields);
        self.sender.encode(&mut fields);

        let mut buf = Vec::with_capacity(1 + fields.len() + 9);
        buf.push(L1_MESSAGE_TX_TYPE);
        Header { list: true, payload_length: fields.len() }.encode(&mut buf);
        buf.extend_from_slice(&fields);

        keccak256(&buf)
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for L1Message {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        Ok(Self {
            queue_index: u.arbitrary::<u32>()? as u64,
            gas_limit: u.arbitrary()?,
            to: u.arbitrary()?,
            value: u.arbitrary()?,
            sender: u.arbitrary()?,
            input: u.arbitrary()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::L1Message;

    use alloy_primitives::{address, bytes, U256};

    #[test]
    fn test_tx_hash_is_deterministic() {
        let message = L1Message {
            queue_index: 33,
            gas_limit: 168000,
            to: address!("781e90f1c8fc4611c9b7497c3b47f99ef6969cbc"),
            value: U256::ZERO,
            sender: address!("7885bcbd5cecef1336b5300fb5186a12ddd8c478"),
            input: bytes!("8ef1332e"),
        };

        assert_eq!(message.tx_hash(), message.clone().tx_hash());
    }

    #[test]
    fn test_tx_hash_commits_to_queue_index() {
        let message = L1Message {
            queue_index: 0,
            gas_limit: 21000,
            to: address!("781e90f1c8fc4611c9b7497c3b47f99ef6969cbc"),
            value: U256::from(10),
            sender: address!("7885bcbd5cecef1336b5300fb5186a12ddd8c478"),
            input: bytes!(""),
        };
        let replayed = L1Message { queue_index: 1, ..message.clone() };

        assert_ne!(message.tx_hash(), replayed.tx_hash());
    }
}
