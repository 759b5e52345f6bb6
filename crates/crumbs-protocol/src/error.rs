//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when encoding, decoding or verifying CRUMBS frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A frame buffer or payload slice has the wrong fixed size.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length required by the frame revision.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The recomputed CRC does not match the received trailing byte.
    #[error("checksum mismatch: computed 0x{expected:02X}, received 0x{actual:02X}")]
    ChecksumMismatch {
        /// CRC recomputed over the received frame.
        expected: u8,
        /// Trailing byte carried by the frame.
        actual: u8,
    },

    /// Unknown frame revision name.
    #[error("invalid frame revision: {0:?} (expected \"a\" or \"b\")")]
    InvalidRevision(String),
}

impl ProtocolError {
    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        ProtocolError::LengthMismatch { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::length_mismatch(27, 26);
        assert_eq!(err.to_string(), "length mismatch: expected 27, got 26");

        let err = ProtocolError::ChecksumMismatch {
            expected: 0x47,
            actual: 0x00,
        };
        assert!(err.to_string().contains("0x47"));
        assert!(err.to_string().contains("0x00"));
    }
}
