//! Primitive types shared by the rollup bridge core.

pub use message::L1Message;
mod message;

pub use alias::{apply_l1_to_l2_alias, undo_l1_to_l2_alias};
mod alias;

pub mod abi;
pub mod constants;
pub mod events;

pub use traits::{BlobSource, GasOracle, Host, ProofVerifier, WithdrawRootProvider};
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
