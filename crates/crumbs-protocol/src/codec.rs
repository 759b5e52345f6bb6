//! Frame encoding and decoding.
//!
//! ## Frame Format
//!
//! | Field        | Size (bytes) | Description                                   |
//! |--------------|--------------|-----------------------------------------------|
//! | type_id      | 1            | Message category                              |
//! | command_type | 1            | Command within the category                   |
//! | payload      | N * 4        | Little-endian IEEE-754 `f32`s (N = 6 or 7)    |
//! | trailer      | 1            | Error flags (Revision A) or CRC-8 (Revision B)|
//!
//! Decoding never rejects a frame because of its CRC. The caller inspects
//! [`DecodedFrame`] and decides what to do with a mismatch.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::ProtocolError;
use crate::message::Message;
use crate::revision::{Revision, RevisionA, RevisionB};

// ============================================================================
// Encoding
// ============================================================================

/// Encode a message into its fixed-size frame.
///
/// For Revision B the CRC over the first `FRAME_LEN - 1` bytes is computed
/// here and stored in the last byte.
pub fn encode<R: Revision>(message: &Message<R>) -> R::Frame {
    let mut frame = R::Frame::default();
    {
        let mut buf = &mut frame.as_mut()[..R::FRAME_LEN - 1];
        buf.put_u8(message.type_id);
        buf.put_u8(message.command_type);
        for &value in message.payload.as_ref() {
            buf.put_f32_le(value);
        }
        debug_assert!(buf.is_empty());
    }
    let bytes = frame.as_mut();
    let trailer = R::trailer(&bytes[..R::FRAME_LEN - 1], &message.check);
    bytes[R::FRAME_LEN - 1] = trailer;

    log::trace!(
        "encoded revision {} frame: {}",
        R::REVISION,
        hex::encode(frame.as_ref())
    );
    frame
}

/// Encode a message into a heap buffer of exactly `R::FRAME_LEN` bytes.
pub fn encode_to_vec<R: Revision>(message: &Message<R>) -> Vec<u8> {
    encode(message).as_ref().to_vec()
}

// ============================================================================
// Decoding
// ============================================================================

/// A decoded frame together with its integrity information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedFrame<R: Revision> {
    /// Fields unpacked from the frame.
    pub message: Message<R>,
    /// Trailing byte as received.
    pub trailer: u8,
    /// CRC recomputed over the leading bytes; `None` for revisions without
    /// a CRC.
    pub computed_crc: Option<u8>,
}

impl<R: Revision> DecodedFrame<R> {
    /// Whether the recomputed CRC matches the received trailer. Always true
    /// for revisions without a CRC.
    pub fn is_intact(&self) -> bool {
        self.computed_crc.map_or(true, |crc| crc == self.trailer)
    }

    /// Return the message if the frame is intact.
    pub fn verify(self) -> Result<Message<R>, ProtocolError> {
        match self.computed_crc {
            Some(crc) if crc != self.trailer => Err(ProtocolError::ChecksumMismatch {
                expected: crc,
                actual: self.trailer,
            }),
            _ => Ok(self.message),
        }
    }
}

impl fmt::Display for DecodedFrame<RevisionA> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.message, f)
    }
}

impl fmt::Display for DecodedFrame<RevisionB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.message.to_string();
        // Replace the closing paren with the CRC fields.
        write!(f, "{}, crc8={}", &text[..text.len() - 1], self.trailer)?;
        if !self.is_intact() {
            if let Some(crc) = self.computed_crc {
                write!(f, " (computed {})", crc)?;
            }
        }
        write!(f, ")")
    }
}

/// Decode a frame.
///
/// Fails with [`ProtocolError::LengthMismatch`] unless `data` is exactly
/// `R::FRAME_LEN` bytes long.
pub fn decode<R: Revision>(data: &[u8]) -> Result<DecodedFrame<R>, ProtocolError> {
    if data.len() != R::FRAME_LEN {
        return Err(ProtocolError::length_mismatch(R::FRAME_LEN, data.len()));
    }

    let body = &data[..R::FRAME_LEN - 1];
    let trailer = data[R::FRAME_LEN - 1];

    let mut buf = body;
    let type_id = buf.get_u8();
    let command_type = buf.get_u8();
    let mut payload = R::Payload::default();
    for value in payload.as_mut() {
        *value = buf.get_f32_le();
    }

    let decoded = DecodedFrame {
        message: Message::new(
            type_id,
            command_type,
            payload,
            R::check_from_trailer(trailer),
        ),
        trailer,
        computed_crc: R::computed_crc(body),
    };

    log::trace!(
        "decoded revision {} frame: {} (intact: {})",
        R::REVISION,
        hex::encode(data),
        decoded.is_intact()
    );
    Ok(decoded)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageA, MessageB};
    use crate::revision::ErrorFlags;

    const KNOWN_A: [u8; 27] = [
        0x01, 0x01, 0x00, 0x00, 0x96, 0x42, 0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x82, 0x42, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0xE0, 0x40, 0x00,
    ];

    #[test]
    fn test_revision_a_known_vector() {
        let msg = MessageA::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0], ErrorFlags(0));
        assert_eq!(encode(&msg), KNOWN_A);
    }

    #[test]
    fn test_revision_b_known_vector() {
        let msg = MessageB::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0, 0.0], ());
        let frame = encode(&msg);
        assert_eq!(frame.len(), 31);
        assert_eq!(&frame[..26], &KNOWN_A[..26]);
        assert_eq!(&frame[26..30], &[0, 0, 0, 0]);
        assert_eq!(frame[30], 0x47);
    }

    #[test]
    fn test_revision_a_roundtrip() {
        let msg = MessageA::new(
            7,
            200,
            [-1.5, 3.25, f32::MAX, f32::MIN_POSITIVE, 0.0, -0.0],
            ErrorFlags(0xA5),
        );
        let decoded = decode::<RevisionA>(&encode(&msg)).unwrap();
        assert_eq!(decoded.message, msg);
        assert_eq!(decoded.trailer, 0xA5);
        assert_eq!(decoded.computed_crc, None);
        assert!(decoded.is_intact());
    }

    #[test]
    fn test_revision_b_roundtrip() {
        let msg = MessageB::new(0, 255, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], ());
        let frame = encode(&msg);
        let decoded = decode::<RevisionB>(&frame).unwrap();
        assert_eq!(decoded.message, msg);
        assert_eq!(decoded.trailer, frame[30]);
        assert_eq!(decoded.computed_crc, Some(frame[30]));
        assert_eq!(decoded.verify().unwrap(), msg);
    }

    #[test]
    fn test_special_floats_pass_through() {
        let msg = MessageB::new(
            3,
            4,
            [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, 1.0, 2.0, 3.0],
            (),
        );
        let decoded = decode::<RevisionB>(&encode(&msg)).unwrap();
        assert!(decoded.message.payload[0].is_nan());
        assert_eq!(decoded.message.payload[1], f32::INFINITY);
        assert_eq!(decoded.message.payload[2], f32::NEG_INFINITY);
        assert!(decoded.is_intact());
    }

    #[test]
    fn test_decode_wrong_length() {
        for len in [0, 26, 28] {
            let err = decode::<RevisionA>(&vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                ProtocolError::LengthMismatch {
                    expected: 27,
                    actual: len
                }
            );
        }
        let err = decode::<RevisionB>(&KNOWN_A).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::LengthMismatch {
                expected: 31,
                actual: 27
            }
        );
    }

    #[test]
    fn test_corrupted_crc_reported_not_rejected() {
        let msg = MessageB::new(1, 2, [0.25; 7], ());
        let mut frame = encode(&msg);
        frame[5] ^= 0x10;

        let decoded = decode::<RevisionB>(&frame).unwrap();
        assert!(!decoded.is_intact());
        let computed = decoded.computed_crc.unwrap();
        assert_ne!(computed, decoded.trailer);
        assert_eq!(
            decoded.verify().unwrap_err(),
            ProtocolError::ChecksumMismatch {
                expected: computed,
                actual: frame[30]
            }
        );
    }

    #[test]
    fn test_encode_to_vec_length() {
        let msg = MessageA::default();
        assert_eq!(encode_to_vec(&msg).len(), 27);
        let msg = MessageB::default();
        assert_eq!(encode_to_vec(&msg).len(), 31);
    }

    #[test]
    fn test_decoded_display() {
        let msg = MessageB::new(1, 1, [1.0; 7], ());
        let frame = encode(&msg);
        let text = decode::<RevisionB>(&frame).unwrap().to_string();
        assert!(text.ends_with(&format!(", crc8={})", frame[30])));

        let mut bad = frame;
        bad[30] ^= 0xFF;
        let text = decode::<RevisionB>(&bad).unwrap().to_string();
        assert!(text.contains("(computed "));

        let msg = MessageA::new(1, 1, [1.0; 6], ErrorFlags(4));
        let text = decode::<RevisionA>(&encode(&msg)).unwrap().to_string();
        assert!(text.ends_with("errorFlags=4)"));
    }
}
