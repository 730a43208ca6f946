/// An error occurring while encoding or decoding a batch header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The input buffer is empty.
    #[error("empty batch header input")]
    Empty,
    /// The version byte does not map to a supported header layout.
    #[error("unsupported batch header version {0}")]
    UnsupportedVersion(u8),
    /// The input buffer is shorter than the version's fixed layout.
    #[error("end of file")]
    Eof,
    /// The input buffer length does not exactly match the expected encoded length.
    #[error("batch header length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch {
        /// The exact length the version's layout requires.
        expected: usize,
        /// The length of the provided buffer.
        got: usize,
    },
}
