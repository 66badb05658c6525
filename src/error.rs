//! Error type shared by every codec in the crate.
//!
//! Decoding failures are split into two families: malformed input (the
//! buffer ran out or a field is structurally invalid) and integrity failures
//! (the payload does not match what its header declares). Both are returned
//! as values; nothing in the library panics on peer-supplied bytes.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Debug, Error)]
pub enum WireError {
    /// The buffer ended before `context` could be read.
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("malformed {context}: {reason}")]
    Malformed {
        context: &'static str,
        reason: String,
    },

    /// Fewer than 24 bytes were supplied to the header parser.
    #[error("message header needs 24 bytes, got {len}")]
    ShortHeader { len: usize },

    #[error("payload length mismatch: header declares {declared} bytes, got {actual}")]
    PayloadLength { declared: u32, actual: usize },

    #[error("payload too large: {len} bytes exceeds limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("checksum mismatch: header has {}, payload hashes to {}", hex::encode(.expected), hex::encode(.actual))]
    ChecksumMismatch { expected: [u8; 4], actual: [u8; 4] },

    #[error("network magic mismatch: expected {}, found {}", hex::encode(.expected), hex::encode(.found))]
    MagicMismatch { expected: [u8; 4], found: [u8; 4] },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WireError {
    pub(crate) fn eof(context: &'static str) -> Self {
        WireError::UnexpectedEof { context }
    }

    pub(crate) fn malformed(context: &'static str, reason: impl Into<String>) -> Self {
        WireError::Malformed {
            context,
            reason: reason.into(),
        }
    }

    /// Returns true for failures caused by the payload disagreeing with its
    /// header rather than by unreadable input.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            WireError::PayloadLength { .. }
                | WireError::ChecksumMismatch { .. }
                | WireError::MagicMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_mismatch_renders_hex() {
        let err = WireError::ChecksumMismatch {
            expected: [0xde, 0xad, 0xbe, 0xef],
            actual: [0, 1, 2, 3],
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: header has deadbeef, payload hashes to 00010203"
        );
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn eof_is_not_an_integrity_failure() {
        let err = WireError::eof("version: nonce");
        assert!(!err.is_integrity_failure());
        assert_eq!(
            err.to_string(),
            "unexpected end of input while reading version: nonce"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: WireError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, WireError::Io(_)));
    }
}
