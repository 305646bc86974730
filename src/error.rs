//! Crate-wide error type.
//!
//! Matches this corpus's existing convention of a plain enum with a
//! hand-written [`core::fmt::Display`] impl rather than a `thiserror` derive.

use core::fmt;

/// Everything that can go wrong building, training, sampling, or
/// (de)serializing a [`crate::model::Model`].
#[derive(Debug)]
pub enum Error {
    /// A `try_reserve` allocation failed. The operation that triggered it
    /// left the model in its pre-call state.
    OutOfMemory,
    /// `bucket_bits` was outside `[MIN_BUCKET_BITS, MAX_BUCKET_BITS]`.
    InvalidBucketBits(u32),
    /// A code point or byte sequence was not valid UTF-8 where strictness is
    /// required (during [`crate::binary`] load; training silently skips
    /// invalid bytes instead of raising this).
    InvalidUtf8,
    /// The file did not start with the expected 4-byte magic.
    BadMagic,
    /// The file declared a format version this crate does not understand.
    BadVersion(u64),
    /// The stream ended before a record was fully read.
    TruncatedInput,
    /// The stream was structurally well-formed UTF-8/LEB128 but violated a
    /// record-level contract (duplicate rule name, zero weight paired with a
    /// nonzero character, or a LEB128 value longer than 10 bytes).
    CorruptRecord(&'static str),
    /// An I/O failure from the underlying reader or writer.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "allocation failed"),
            Self::InvalidBucketBits(bits) => {
                write!(f, "bucket_bits {} is out of range [1, 24]", bits)
            }
            Self::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            Self::BadMagic => write!(f, "bad magic number"),
            Self::BadVersion(v) => write!(f, "unsupported format version {}", v),
            Self::TruncatedInput => write!(f, "input ended mid-record"),
            Self::CorruptRecord(reason) => write!(f, "corrupt record: {}", reason),
            #[cfg(feature = "std")]
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
