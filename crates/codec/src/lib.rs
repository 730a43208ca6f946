//! Versioned batch header codec for the rollup bridge.
//!
//! Each supported version is a fixed big-endian layout; some versions carry a trailing
//! skipped-message bitmap whose length is derived from the popped-message count embedded in
//! the fixed prefix. Validation here is purely structural: hash linkage and index continuity
//! are checked by the rollup chain, not the codec.

pub use error::CodecError;
mod error;

pub mod constants;
mod macros;

pub use v0::BatchHeaderV0;
mod v0;

pub use v1::BatchHeaderV1;
mod v1;

pub use v3::BatchHeaderV3;
mod v3;

pub use v7::BatchHeaderV7;
mod v7;

use alloy_primitives::B256;

/// The batch header, dispatching on the leading version byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchHeader {
    /// The batch header for V0.
    V0(BatchHeaderV0),
    /// The batch header for V1 and V2.
    V1(BatchHeaderV1),
    /// The batch header for V3 through V6.
    V3(BatchHeaderV3),
    /// The batch header for V7.
    V7(BatchHeaderV7),
}

impl BatchHeader {
    /// Decodes the provided buffer into the appropriate batch header version.
    ///
    /// The buffer must contain exactly one encoded header: any length mismatch for the
    /// selected version fails the decode.
    pub fn decode(mut buf: &[u8]) -> Result<Self, CodecError> {
        let version = *buf.first().ok_or(CodecError::Empty)?;

        match version {
            0 => Ok(Self::V0(BatchHeaderV0::try_from_buf(&mut buf)?)),
            1..=2 => Ok(Self::V1(BatchHeaderV1::try_from_buf(&mut buf)?)),
            3..=6 => Ok(Self::V3(BatchHeaderV3::try_from_buf(&mut buf)?)),
            7 => Ok(Self::V7(BatchHeaderV7::try_from_buf(&mut buf)?)),
            v => Err(CodecError::UnsupportedVersion(v)),
        }
    }

    /// Returns the version of the header.
    pub const fn version(&self) -> u8 {
        match self {
            Self::V0(header) => header.version,
            Self::V1(header) => header.version,
            Self::V3(header) => header.version,
            Self::V7(header) => header.version,
        }
    }

    /// Returns the index of the batch.
    pub const fn batch_index(&self) -> u64 {
        match self {
            Self::V0(header) => header.batch_index,
            Self::V1(header) => header.batch_index,
            Self::V3(header) => header.batch_index,
            Self::V7(header) => header.batch_index,
        }
    }

    /// Returns the number of L1 messages popped in the batch, if the version tracks it.
    pub const fn l1_message_popped(&self) -> Option<u64> {
        match self {
            Self::V0(header) => Some(header.l1_message_popped),
            Self::V1(header) => Some(header.l1_message_popped),
            Self::V3(header) => Some(header.l1_message_popped),
            Self::V7(_) => None,
        }
    }

    /// Returns the total number of L1 messages popped after the batch, if the version tracks
    /// it.
    pub const fn total_l1_message_popped(&self) -> Option<u64> {
        match self {
            Self::V0(header) => Some(header.total_l1_message_popped),
            Self::V1(header) => Some(header.total_l1_message_popped),
            Self::V3(header) => Some(header.total_l1_message_popped),
            Self::V7(_) => None,
        }
    }

    /// Returns the blob versioned hash for the batch, if the version carries one.
    pub const fn blob_versioned_hash(&self) -> Option<B256> {
        match self {
            Self::V0(_) => None,
            Self::V1(header) => Some(header.blob_versioned_hash),
            Self::V3(header) => Some(header.blob_versioned_hash),
            Self::V7(header) => Some(header.blob_versioned_hash),
        }
    }

    /// Returns the parent batch hash.
    pub const fn parent_batch_hash(&self) -> B256 {
        match self {
            Self::V0(header) => header.parent_batch_hash,
            Self::V1(header) => header.parent_batch_hash,
            Self::V3(header) => header.parent_batch_hash,
            Self::V7(header) => header.parent_batch_hash,
        }
    }

    /// Encodes the header into its canonical byte representation.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::V0(header) => header.encode(),
            Self::V1(header) => header.encode(),
            Self::V3(header) => header.encode(),
            Self::V7(header) => header.encode(),
        }
    }

    /// Computes the canonical hash of the header: keccak256 over the full encoded buffer,
    /// identically across versions.
    pub fn hash_slow(&self) -> B256 {
        match self {
            Self::V0(header) => header.hash_slow(),
            Self::V1(header) => header.hash_slow(),
            Self::V3(header) => header.hash_slow(),
            Self::V7(header) => header.hash_slow(),
        }
    }
}
