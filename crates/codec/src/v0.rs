use crate::{
    constants::SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE, error::CodecError,
    from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf,
};

use alloy_primitives::{
    bytes::{Buf, BufMut},
    keccak256, B256, U256,
};

/// The batch header for V0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeaderV0 {
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
    /// The parent batch hash.
    pub parent_batch_hash: B256,
    /// A bitmap to indicate which L1 messages are skipped in the batch.
    pub skipped_l1_message_bitmap: Vec<U256>,
}

impl BatchHeaderV0 {
    /// The length of the fixed-layout prefix.
    pub const BYTES_LENGTH: usize = 89;

    /// Returns a new instance [`BatchHeaderV0`].
    pub fn new(
        version: u8,
        batch_index: u64,
        l1_message_popped: u64,
        total_l1_message_popped: u64,
        data_hash: B256,
        parent_batch_hash: B256,
        skipped_l1_message_bitmap: Vec<U256>,
    ) -> Self {
        Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            parent_batch_hash,
            skipped_l1_message_bitmap,
        }
    }

    /// Tries to read from the input buffer into the [`BatchHeaderV0`].
    ///
    /// The buffer must contain exactly the fixed prefix followed by
    /// `ceil(l1_message_popped / 256)` bitmap words, else decoding fails.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if buf.len() < Self::BYTES_LENGTH {
            return Err(CodecError::Eof)
        }
        let got = buf.len();

        let version = from_be_bytes_slice_and_advance_buf!(u8, buf);
        let batch_index = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let total_l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let data_hash = from_slice_and_advance_buf!(B256, buf);
        let parent_batch_hash = from_slice_and_advance_buf!(B256, buf);

        let expected = Self::BYTES_LENGTH +
            l1_message_popped.div_ceil(256) as usize * SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE;
        if got != expected {
            return Err(CodecError::LengthMismatch { expected, got })
        }

        let skipped_l1_message_bitmap: Vec<_> = buf
            .chunks(SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE)
            .map(U256::from_be_slice)
            .collect();
        buf.advance(got - Self::BYTES_LENGTH);

        Ok(Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            parent_batch_hash,
            skipped_l1_message_bitmap,
        })
    }

    /// Encodes the header into its canonical byte representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(
            Self::BYTES_LENGTH +
                self.skipped_l1_message_bitmap.len() * SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE,
        );
        bytes.put_slice(&self.version.to_be_bytes());
        bytes.put_slice(&self.batch_index.to_be_bytes());
        bytes.put_slice(&self.l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.total_l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.data_hash.0);
        bytes.put_slice(&self.parent_batch_hash.0);

        for word in &self.skipped_l1_message_bitmap {
            bytes.put_slice(&word.to_be_bytes::<32>());
        }

        bytes
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::BatchHeaderV0;
    use crate::error::CodecError;

    use alloy_primitives::{b256, U256};

    #[test]
    fn test_should_round_trip_header() -> eyre::Result<()> {
        let header = BatchHeaderV0::new(
            0,
            9,
            1,
            33,
            b256!("2aa3eeb5adebb96a49736583c744b89b0b3be45056e8e178106a42ab2cd1a063"),
            b256!("c0173d7e3561501cf57913763c7c34716216092a222a99fe8b85dcb466730f56"),
            vec![U256::from(1)],
        );

        let encoded = header.encode();
        assert_eq!(encoded.len(), BatchHeaderV0::BYTES_LENGTH + 32);

        let decoded = BatchHeaderV0::try_from_buf(&mut &*encoded)?;
        assert_eq!(decoded, header);

        Ok(())
    }

    #[test]
    fn test_should_reject_wrong_length() {
        let header = BatchHeaderV0::new(
            0,
            9,
            1,
            33,
            b256!("2aa3eeb5adebb96a49736583c744b89b0b3be45056e8e178106a42ab2cd1a063"),
            b256!("c0173d7e3561501cf57913763c7c34716216092a222a99fe8b85dcb466730f56"),
            vec![U256::from(1)],
        );

        let mut encoded = header.encode();
        encoded.push(0);
        assert_eq!(
            BatchHeaderV0::try_from_buf(&mut &*encoded),
            Err(CodecError::LengthMismatch { expected: 121, got: 122 })
        );

        // missing bitmap word entirely.
        let truncated = &header.encode()[..BatchHeaderV0::BYTES_LENGTH];
        assert_eq!(
            BatchHeaderV0::try_from_buf(&mut &*truncated),
            Err(CodecError::LengthMismatch { expected: 121, got: 89 })
        );
    }

    #[test]
    fn test_should_hash_header() {
        let header = BatchHeaderV0::new(
            0,
            9,
            1,
            33,
            b256!("2aa3eeb5adebb96a49736583c744b89b0b3be45056e8e178106a42ab2cd1a063"),
            b256!("c0173d7e3561501cf57913763c7c34716216092a222a99fe8b85dcb466730f56"),
            vec![U256::ZERO],
        );

        let expected = b256!("A7F7C528E1827D3E64E406C76DE6C750D5FC3DE3DE4386E6C69958A89461D064");
        assert_eq!(header.hash_slow(), expected);
    }
}
