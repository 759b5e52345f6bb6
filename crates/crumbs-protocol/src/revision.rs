//! Frame revisions.
//!
//! Two incompatible CRUMBS wire formats exist. Both ends of a link must agree
//! on one; the frame bytes carry no discriminant, so nothing here tries to
//! detect the revision from data.
//!
//! | Revision | Frame length | Payload floats | Trailing byte            |
//! |----------|--------------|----------------|--------------------------|
//! | A        | 27           | 6              | error-flags bitmap       |
//! | B        | 31           | 7              | CRC-8 over bytes 0..30   |
//!
//! [`FrameRevision`] is the runtime tag used in configuration. The sealed
//! [`Revision`] trait carries the same information at the type level so that
//! payload arity and frame size are array types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::crc;
use crate::error::ProtocolError;

/// Runtime selector for the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRevision {
    /// 27-byte frames, 6 floats, error-flags trailer.
    A,
    /// 31-byte frames, 7 floats, CRC-8 trailer.
    #[default]
    B,
}

impl FrameRevision {
    /// Total frame size in bytes.
    pub const fn frame_len(self) -> usize {
        match self {
            FrameRevision::A => REVISION_A_FRAME_LEN,
            FrameRevision::B => REVISION_B_FRAME_LEN,
        }
    }

    /// Number of payload floats.
    pub const fn payload_len(self) -> usize {
        match self {
            FrameRevision::A => REVISION_A_PAYLOAD_LEN,
            FrameRevision::B => REVISION_B_PAYLOAD_LEN,
        }
    }

    /// Whether the trailing byte is a CRC-8.
    pub const fn has_crc(self) -> bool {
        matches!(self, FrameRevision::B)
    }
}

impl fmt::Display for FrameRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRevision::A => write!(f, "A"),
            FrameRevision::B => write!(f, "B"),
        }
    }
}

impl FromStr for FrameRevision {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(FrameRevision::A),
            "b" => Ok(FrameRevision::B),
            _ => Err(ProtocolError::InvalidRevision(s.to_string())),
        }
    }
}

/// Application-defined error bits carried by Revision A frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorFlags(pub u8);

impl ErrorFlags {
    /// No bits set.
    pub const fn empty() -> Self {
        ErrorFlags(0)
    }

    /// Raw bitmap.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether bit `bit` (0..=7) is set.
    pub const fn contains(self, bit: u8) -> bool {
        bit < 8 && self.0 & (1 << bit) != 0
    }

    /// Copy with bit `bit` (0..=7) set. Out-of-range bits are ignored.
    #[must_use]
    pub const fn with(self, bit: u8) -> Self {
        if bit < 8 {
            ErrorFlags(self.0 | (1 << bit))
        } else {
            self
        }
    }

    /// Whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<u8> for ErrorFlags {
    fn from(bits: u8) -> Self {
        ErrorFlags(bits)
    }
}

impl From<ErrorFlags> for u8 {
    fn from(flags: ErrorFlags) -> Self {
        flags.0
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::RevisionA {}
    impl Sealed for super::RevisionB {}
}

/// Static layout of one wire revision.
///
/// Implemented only by [`RevisionA`] and [`RevisionB`].
pub trait Revision:
    sealed::Sealed + fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Runtime tag.
    const REVISION: FrameRevision;
    /// Number of payload floats.
    const PAYLOAD_LEN: usize;
    /// Total frame size in bytes.
    const FRAME_LEN: usize;

    /// Fixed-size payload array.
    type Payload: fmt::Debug
        + Clone
        + Copy
        + PartialEq
        + Default
        + AsRef<[f32]>
        + AsMut<[f32]>
        + Send
        + Sync;

    /// Fixed-size frame array.
    type Frame: fmt::Debug
        + Clone
        + Copy
        + PartialEq
        + Eq
        + Default
        + AsRef<[u8]>
        + AsMut<[u8]>
        + Send
        + Sync;

    /// Value carried by the message for the trailing byte.
    type Check: fmt::Debug + Clone + Copy + PartialEq + Default + Send + Sync;

    /// Trailing byte for a frame whose leading `FRAME_LEN - 1` bytes are
    /// `body`.
    fn trailer(body: &[u8], check: &Self::Check) -> u8;

    /// Message check recovered from a received trailing byte.
    fn check_from_trailer(trailer: u8) -> Self::Check;

    /// CRC recomputed over `body`, for revisions that carry one.
    fn computed_crc(body: &[u8]) -> Option<u8>;
}

/// 27-byte frames with an error-flags trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RevisionA;

/// 31-byte frames with a CRC-8 trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RevisionB;

impl Revision for RevisionA {
    const REVISION: FrameRevision = FrameRevision::A;
    const PAYLOAD_LEN: usize = REVISION_A_PAYLOAD_LEN;
    const FRAME_LEN: usize = REVISION_A_FRAME_LEN;

    type Payload = [f32; REVISION_A_PAYLOAD_LEN];
    type Frame = [u8; REVISION_A_FRAME_LEN];
    type Check = ErrorFlags;

    fn trailer(_body: &[u8], check: &ErrorFlags) -> u8 {
        check.bits()
    }

    fn check_from_trailer(trailer: u8) -> ErrorFlags {
        ErrorFlags(trailer)
    }

    fn computed_crc(_body: &[u8]) -> Option<u8> {
        None
    }
}

impl Revision for RevisionB {
    const REVISION: FrameRevision = FrameRevision::B;
    const PAYLOAD_LEN: usize = REVISION_B_PAYLOAD_LEN;
    const FRAME_LEN: usize = REVISION_B_FRAME_LEN;

    type Payload = [f32; REVISION_B_PAYLOAD_LEN];
    type Frame = [u8; REVISION_B_FRAME_LEN];
    type Check = ();

    fn trailer(body: &[u8], _check: &()) -> u8 {
        crc::calculate(body)
    }

    fn check_from_trailer(_trailer: u8) {}

    fn computed_crc(body: &[u8]) -> Option<u8> {
        Some(crc::calculate(body))
    }
}
