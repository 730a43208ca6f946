//! Mock collaborators for tests.

use crate::{BlobSource, GasOracle, Host, ProofVerifier};

use std::collections::BTreeSet;

use alloy_primitives::{Address, Bytes, B256, U256};

/// A [`GasOracle`] with linear pricing.
#[derive(Debug, Clone)]
pub struct MockGasOracle {
    /// The fee charged per unit of gas.
    pub fee_per_gas: u64,
    /// The flat intrinsic gas cost.
    pub base_intrinsic_gas: u64,
    /// The intrinsic gas cost per calldata byte.
    pub intrinsic_gas_per_byte: u64,
}

impl Default for MockGasOracle {
    fn default() -> Self {
        Self { fee_per_gas: 2, base_intrinsic_gas: 21000, intrinsic_gas_per_byte: 16 }
    }
}

impl GasOracle for MockGasOracle {
    fn estimate_fee(&self, gas_limit: u64) -> U256 {
        U256::from(gas_limit) * U256::from(self.fee_per_gas)
    }

    fn intrinsic_gas(&self, data: &[u8]) -> u64 {
        self.base_intrinsic_gas + data.len() as u64 * self.intrinsic_gas_per_byte
    }
}

/// A [`ProofVerifier`] that accepts or rejects every proof.
#[derive(Debug, Clone)]
pub struct MockVerifier {
    /// Whether proofs verify.
    pub accept: bool,
}

impl MockVerifier {
    /// Returns a verifier accepting every proof.
    pub const fn accepting() -> Self {
        Self { accept: true }
    }

    /// Returns a verifier rejecting every proof.
    pub const fn rejecting() -> Self {
        Self { accept: false }
    }
}

impl ProofVerifier for MockVerifier {
    fn verify(&self, _proof: &[u8], _public_input: B256) -> bool {
        self.accept
    }
}

/// A [`BlobSource`] returning a fixed versioned hash.
#[derive(Debug, Clone, Default)]
pub struct MockBlobSource {
    /// The versioned hash attached to the current transaction, if any.
    pub hash: Option<B256>,
}

impl BlobSource for MockBlobSource {
    fn blob_versioned_hash(&self) -> Option<B256> {
        self.hash
    }
}

/// A recording [`Host`] with configurable failures.
#[derive(Debug, Default)]
pub struct MockHost {
    /// Accounts with deployed code.
    pub code: BTreeSet<Address>,
    /// Targets whose calls and transfers fail.
    pub failing: BTreeSet<Address>,
    /// All successful transfers, in order.
    pub transfers: Vec<(Address, U256)>,
    /// All successful calls, in order.
    pub calls: Vec<(Address, U256, Bytes)>,
    /// The timestamp reported to the core.
    pub now: u64,
}

impl MockHost {
    /// Returns a host with the provided timestamp.
    pub fn at_time(now: u64) -> Self {
        Self { now, ..Default::default() }
    }

    /// Marks the account as having deployed code.
    pub fn deploy_code(&mut self, account: Address) {
        self.code.insert(account);
    }

    /// Makes every call and transfer to the target fail.
    pub fn fail_calls_to(&mut self, target: Address) {
        self.failing.insert(target);
    }

    /// Returns the total value successfully transferred to the recipient.
    pub fn transferred_to(&self, to: Address) -> U256 {
        self.transfers
            .iter()
            .filter(|(recipient, _)| *recipient == to)
            .fold(U256::ZERO, |acc, (_, value)| acc + value)
    }
}

impl Host for MockHost {
    fn transfer(&mut self, to: Address, value: U256) -> bool {
        if self.failing.contains(&to) {
            return false;
        }
        self.transfers.push((to, value));
        true
    }

    fn call(&mut self, to: Address, value: U256, data: &[u8]) -> bool {
        if self.failing.contains(&to) {
            return false;
        }
        self.calls.push((to, value, Bytes::copy_from_slice(data)));
        true
    }

    fn has_code(&self, account: Address) -> bool {
        self.code.contains(&account)
    }

    fn timestamp(&self) -> u64 {
        self.now
    }
}
