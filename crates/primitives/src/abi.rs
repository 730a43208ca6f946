//! ABI payloads exchanged between the two messenger endpoints.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    /// The payload executed on the destination chain to relay a message.
    function relayMessage(
        address from,
        address to,
        uint256 value,
        uint256 nonce,
        bytes message
    ) external;

    /// The refund callback invoked on the original sender when a message is dropped.
    function onDropMessage(bytes message) external;
}

/// Encodes the relay payload for the provided message fields.
///
/// The encoding doubles as the canonical identity of the logical message: replays share it
/// (the nonce inside the payload stays fixed), so its keccak256 hash keys the messenger's
/// executed/replay/drop bookkeeping on both chains.
pub fn encode_relay_payload(
    from: Address,
    to: Address,
    value: U256,
    nonce: U256,
    message: &Bytes,
) -> Bytes {
    relayMessageCall { from, to, value, nonce, message: message.clone() }.abi_encode().into()
}

/// Computes the logical message hash for the provided message fields.
pub fn relay_payload_hash(
    from: Address,
    to: Address,
    value: U256,
    nonce: U256,
    message: &Bytes,
) -> B256 {
    keccak256(encode_relay_payload(from, to, value, nonce, message))
}

/// Encodes the drop-refund callback payload carrying the original message.
pub fn encode_drop_callback(message: &Bytes) -> Bytes {
    onDropMessageCall { message: message.clone() }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::{encode_relay_payload, relay_payload_hash};

    use alloy_primitives::{address, bytes, keccak256, U256};

    #[test]
    fn test_relay_payload_hash_matches_encoding() {
        let from = address!("7885bcbd5cecef1336b5300fb5186a12ddd8c478");
        let to = address!("781e90f1c8fc4611c9b7497c3b47f99ef6969cbc");
        let message = bytes!("deadbeef");

        let payload = encode_relay_payload(from, to, U256::from(42), U256::from(7), &message);
        let hash = relay_payload_hash(from, to, U256::from(42), U256::from(7), &message);

        assert_eq!(hash, keccak256(&payload));
    }

    #[test]
    fn test_relay_payload_commits_to_nonce() {
        let from = address!("7885bcbd5cecef1336b5300fb5186a12ddd8c478");
        let to = address!("781e90f1c8fc4611c9b7497c3b47f99ef6969cbc");
        let message = bytes!("deadbeef");

        let original = relay_payload_hash(from, to, U256::ZERO, U256::from(7), &message);
        let other = relay_payload_hash(from, to, U256::ZERO, U256::from(8), &message);

        assert_ne!(original, other);
    }
}
