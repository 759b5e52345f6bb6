//! The CRUMBS message value.

use std::fmt;

use crate::error::ProtocolError;
use crate::revision::{ErrorFlags, Revision, RevisionA, RevisionB};

/// One CRUMBS message: type, command, fixed-arity float payload and the
/// revision's check value.
///
/// Messages are plain `Copy` values; nothing mutates them after
/// construction except through the public fields of a local copy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Message<R: Revision> {
    /// Message category. See [`TYPE_ID_SYSTEM`](crate::TYPE_ID_SYSTEM) and
    /// [`TYPE_ID_DEBUG`](crate::TYPE_ID_DEBUG).
    pub type_id: u8,
    /// Command within the category.
    pub command_type: u8,
    /// Payload floats. NaN and infinities are carried as-is.
    pub payload: R::Payload,
    /// Error flags (Revision A) or `()` (Revision B, whose CRC is computed
    /// on encode).
    pub check: R::Check,
}

/// Message for 27-byte Revision A frames.
pub type MessageA = Message<RevisionA>;
/// Message for 31-byte Revision B frames.
pub type MessageB = Message<RevisionB>;

impl<R: Revision> Message<R> {
    /// Create a message from a fixed-size payload.
    pub fn new(type_id: u8, command_type: u8, payload: R::Payload, check: R::Check) -> Self {
        Message {
            type_id,
            command_type,
            payload,
            check,
        }
    }

    /// Create a message from a runtime-length payload slice.
    ///
    /// Fails with [`ProtocolError::LengthMismatch`] unless `data` holds
    /// exactly `R::PAYLOAD_LEN` floats. Never pads or truncates.
    pub fn from_slice(
        type_id: u8,
        command_type: u8,
        data: &[f32],
        check: R::Check,
    ) -> Result<Self, ProtocolError> {
        if data.len() != R::PAYLOAD_LEN {
            return Err(ProtocolError::length_mismatch(R::PAYLOAD_LEN, data.len()));
        }
        let mut payload = R::Payload::default();
        payload.as_mut().copy_from_slice(data);
        Ok(Self::new(type_id, command_type, payload, check))
    }

    /// Payload as a slice.
    pub fn data(&self) -> &[f32] {
        self.payload.as_ref()
    }

    fn fmt_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRUMBSMessage(typeID={}, commandType={}, data=[",
            self.type_id, self.command_type
        )?;
        for (i, value) in self.data().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2}", value)?;
        }
        write!(f, "]")
    }
}

impl MessageA {
    /// Error flags carried in the trailing byte.
    pub fn error_flags(&self) -> ErrorFlags {
        self.check
    }
}

impl fmt::Display for MessageA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_header(f)?;
        write!(f, ", errorFlags={})", self.check.bits())
    }
}

impl fmt::Display for MessageB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_header(f)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TYPE_ID_DEBUG;

    #[test]
    fn test_from_slice_exact() {
        let msg = MessageA::from_slice(1, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ErrorFlags(3))
            .unwrap();
        assert_eq!(msg.payload, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(msg.error_flags(), ErrorFlags(3));
    }

    #[test]
    fn test_from_slice_length_mismatch() {
        let err = MessageB::from_slice(1, 2, &[1.0; 6], ()).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::LengthMismatch {
                expected: 7,
                actual: 6
            }
        );

        let err = MessageA::from_slice(1, 2, &[1.0; 7], ErrorFlags(0)).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::LengthMismatch {
                expected: 6,
                actual: 7
            }
        );
    }

    #[test]
    fn test_default_message() {
        let msg = MessageB::default();
        assert_eq!(msg.type_id, 0);
        assert_eq!(msg.command_type, 0);
        assert_eq!(msg.payload, [0.0; 7]);
    }

    #[test]
    fn test_display() {
        let msg = MessageA::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0], ErrorFlags(0));
        assert_eq!(
            msg.to_string(),
            "CRUMBSMessage(typeID=1, commandType=1, data=[75.00, 1.00, 0.00, 65.00, 2.00, 7.00], errorFlags=0)"
        );

        let msg = MessageB::new(TYPE_ID_DEBUG, 9, [0.5; 7], ());
        assert!(msg.to_string().starts_with("CRUMBSMessage(typeID=255, commandType=9"));
        assert!(msg.to_string().ends_with("0.50])"));
    }
}
