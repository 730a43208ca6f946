use crate::{error::CodecError, from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf};

use alloy_primitives::{bytes::BufMut, keccak256, B256};

/// The batch header for V7, the minimal post-upgrade layout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeaderV7 {
    /// The batch version.
    pub version: u8,
    /// The index of the batch.
    pub batch_index: u64,
    /// The blob versioned hash for the batch.
    pub blob_versioned_hash: B256,
    /// The parent batch hash.
    pub parent_batch_hash: B256,
}

impl BatchHeaderV7 {
    /// The exact encoded length.
    pub const BYTES_LENGTH: usize = 73;

    /// Returns a new instance [`BatchHeaderV7`].
    pub const fn new(
        version: u8,
        batch_index: u64,
        blob_versioned_hash: B256,
        parent_batch_hash: B256,
    ) -> Self {
        Self { version, batch_index, blob_versioned_hash, parent_batch_hash }
    }

    /// Tries to read from the input buffer into the [`BatchHeaderV7`].
    ///
    /// The buffer must be exactly [`BatchHeaderV7::BYTES_LENGTH`] bytes.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.len() < Self::BYTES_LENGTH {
            return Err(CodecError::Eof)
        }
        if buf.len() > Self::BYTES_LENGTH {
            return Err(CodecError::LengthMismatch {
                expected: Self::BYTES_LENGTH,
                got: buf.len(),
            })
        }

        let version = from_be_bytes_slice_and_advance_buf!(u8, buf);
        let batch_index = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let blob_versioned_hash = from_slice_and_advance_buf!(B256, buf);
        let parent_batch_hash = from_slice_and_advance_buf!(B256, buf);

        Ok(Self { version, batch_index, blob_versioned_hash, parent_batch_hash })
    }

    /// Encodes the header into its canonical byte representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(Self::BYTES_LENGTH);
        bytes.put_slice(&self.version.to_be_bytes());
        bytes.put_slice(&self.batch_index.to_be_bytes());
        bytes.put_slice(&self.blob_versioned_hash.0);
        bytes.put_slice(&self.parent_batch_hash.0);

        bytes
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(self.encode())
    }
}
