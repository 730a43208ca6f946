//! Protocol constants for the rollup bridge.

use alloy_primitives::{address, Address};

/// The transaction type byte prefixing the canonical encoding of an L1-originated message.
pub const L1_MESSAGE_TX_TYPE: u8 = 0x7E;

/// The offset applied to L1 sender addresses before they are recorded in the message queue.
///
/// The transform is invertible so L2 execution can recover the original L1 sender while
/// guaranteeing the recorded address can never collide with a genuine L2 account.
pub const L1_TO_L2_ALIAS_OFFSET: Address = address!("1111000000000000000000000000000000001111");

/// The cross-domain sender value outside of any relay execution.
pub const DEFAULT_XDOMAIN_MESSAGE_SENDER: Address =
    address!("0000000000000000000000000000000000000001");

/// The cross-domain sender value during a drop-refund callback, distinct from any relayed
/// sender so callees can tell a refund apart from a relayed call.
pub const DROP_XDOMAIN_MESSAGE_SENDER: Address =
    address!("0000000000000000000000000000000000000002");

/// The maximum number of messages a single batch may consume from the queue.
pub const MAX_NUM_MESSAGES_PER_POP: u64 = 256;
