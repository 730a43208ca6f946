use crate::{error::CodecError, from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf};

use alloy_primitives::{bytes::BufMut, keccak256, B256};

/// The batch header for V3 through V6.
///
/// Carries the blob data proof evaluation point and value inline; there is no trailing
/// skipped-message bitmap in these versions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeaderV3 {
    /// The batch version.
    pub version: u8,
    /// The index of the batch.
    pub batch_index: u64,
    /// Number of L1 messages popped in the batch.
    pub l1_message_popped: u64,
    /// Number of total L1 messages popped after the batch.
    pub total_l1_message_popped: u64,
    /// The data hash of the batch.
    pub data_hash: B256,
    /// The blob versioned hash for the batch.
    pub blob_versioned_hash: B256,
    /// The parent batch hash.
    pub parent_batch_hash: B256,
    /// The timestamp of the last block in the batch.
    pub last_block_timestamp: u64,
    /// The blob data proof: z (32 bytes) and y (32 bytes).
    pub blob_data_proof: [B256; 2],
}

impl BatchHeaderV3 {
    /// The exact encoded length.
    pub const BYTES_LENGTH: usize = 193;

    /// Returns a new instance [`BatchHeaderV3`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u8,
        batch_index: u64,
        l1_message_popped: u64,
        total_l1_message_popped: u64,
        data_hash: B256,
        blob_versioned_hash: B256,
        parent_batch_hash: B256,
        last_block_timestamp: u64,
        blob_data_proof: [B256; 2],
    ) -> Self {
        Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            blob_versioned_hash,
            parent_batch_hash,
            last_block_timestamp,
            blob_data_proof,
        }
    }

    /// Tries to read from the input buffer into the [`BatchHeaderV3`].
    ///
    /// The buffer must be exactly [`BatchHeaderV3::BYTES_LENGTH`] bytes.
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

        let l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let total_l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let data_hash = from_slice_and_advance_buf!(B256, buf);
        let blob_versioned_hash = from_slice_and_advance_buf!(B256, buf);
        let parent_batch_hash = from_slice_and_advance_buf!(B256, buf);

        let last_block_timestamp = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let blob_data_proof_z = from_slice_and_advance_buf!(B256, buf);
        let blob_data_proof_y = from_slice_and_advance_buf!(B256, buf);

        Ok(Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            blob_versioned_hash,
            parent_batch_hash,
            last_block_timestamp,
            blob_data_proof: [blob_data_proof_z, blob_data_proof_y],
        })
    }

    /// Encodes the header into its canonical byte representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(Self::BYTES_LENGTH);
        bytes.put_slice(&self.version.to_be_bytes());
        bytes.put_slice(&self.batch_index.to_be_bytes());
        bytes.put_slice(&self.l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.total_l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.data_hash.0);
        bytes.put_slice(&self.blob_versioned_hash.0);
        bytes.put_slice(&self.parent_batch_hash.0);
        bytes.put_slice(&self.last_block_timestamp.to_be_bytes());
        bytes.put_slice(&self.blob_data_proof[0].0);
        bytes.put_slice(&self.blob_data_proof[1].0);

        bytes
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(self.encode())
    }
}
