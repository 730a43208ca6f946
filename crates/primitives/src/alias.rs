use crate::constants::L1_TO_L2_ALIAS_OFFSET;

use alloy_primitives::{aliases::U160, Address};

/// Applies the L1 to L2 alias to the provided address.
///
/// The offset addition wraps modulo 2^160. L2 execution uses the aliased address as the
/// transaction sender for L1-originated messages so they can never impersonate an L2 account.
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
    Address::from(U160::from_be_bytes(address.0 .0).wrapping_add(alias_offset()))
}

/// Recovers the L1 address from its L2 alias. Inverse of [`apply_l1_to_l2_alias`].
pub fn undo_l1_to_l2_alias(address: Address) -> Address {
    Address::from(U160::from_be_bytes(address.0 .0).wrapping_sub(alias_offset()))
}

fn alias_offset() -> U160 {
    U160::from_be_bytes(L1_TO_L2_ALIAS_OFFSET.0 .0)
}
