use alloy_primitives::{Address, B256, U256};

/// An instance of the trait can price cross-domain messages.
#[auto_impl::auto_impl(&, Arc)]
pub trait GasOracle {
    /// Returns the fee required to execute a message with the provided gas limit on the
    /// destination chain.
    fn estimate_fee(&self, gas_limit: u64) -> U256;
    /// Returns the intrinsic gas cost of a message with the provided calldata.
    fn intrinsic_gas(&self, data: &[u8]) -> u64;
}

/// An instance of the trait can verify a validity proof against a public input commitment.
///
/// A `false` return must abort the triggering operation atomically.
#[auto_impl::auto_impl(&, Arc)]
pub trait ProofVerifier {
    /// Verifies the proof against the public input hash.
    fn verify(&self, proof: &[u8], public_input: B256) -> bool;
}

/// An instance of the trait can provide the versioned hash of the blob carrying a batch's
/// data-availability payload at commit time.
#[auto_impl::auto_impl(&, Arc)]
pub trait BlobSource {
    /// Returns the versioned hash of the current blob, if one is attached.
    fn blob_versioned_hash(&self) -> Option<B256>;
}

/// An instance of the trait exposes the finalized frontier of the rollup chain: which batches
/// are finalized and the withdraw roots recorded for them.
#[auto_impl::auto_impl(&)]
pub trait WithdrawRootProvider {
    /// Returns true if the batch at the provided index is finalized.
    fn is_batch_finalized(&self, batch_index: u64) -> bool;
    /// Returns the withdraw root recorded when the batch was finalized, if any.
    fn withdraw_root(&self, batch_index: u64) -> Option<B256>;
}

/// The host execution environment the bridge runs in.
///
/// The host serializes all state-mutating operations and moves value on behalf of the core.
/// Call outcomes are reported as booleans: the core decides per call site whether a failed
/// call aborts the operation (fee vault, refunds) or is recorded and tolerated (relays).
#[auto_impl::auto_impl(&mut, Box)]
pub trait Host {
    /// Transfers value to the recipient. Returns false if the recipient refuses it.
    fn transfer(&mut self, to: Address, value: U256) -> bool;
    /// Calls the target with the provided value and calldata, returning whether the call
    /// succeeded.
    fn call(&mut self, to: Address, value: U256, data: &[u8]) -> bool;
    /// Returns true if the account has deployed code.
    fn has_code(&self, account: Address) -> bool;
    /// Returns the current timestamp.
    fn timestamp(&self) -> u64;
}
