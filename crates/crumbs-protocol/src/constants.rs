//! Protocol constants
//!
//! Layout sizes, reserved type identifiers and CRC parameters shared by the
//! host and the CRUMBS peripheral firmware.

// ============================================================================
// Reserved Type IDs
// ============================================================================

/// Type ID reserved for system/control messages.
pub const TYPE_ID_SYSTEM: u8 = 0;
/// Type ID reserved for debug messages.
pub const TYPE_ID_DEBUG: u8 = 255;

// ============================================================================
// Frame Layout
// ============================================================================

/// Bytes taken by the header (type ID + command type).
pub const HEADER_SIZE: usize = 2;
/// Bytes taken by each payload element (IEEE-754 binary32).
pub const FLOAT_SIZE: usize = 4;
/// Bytes taken by the trailing check byte.
pub const TRAILER_SIZE: usize = 1;

/// Offset of the type ID byte.
pub const TYPE_ID_OFFSET: usize = 0;
/// Offset of the command type byte.
pub const COMMAND_TYPE_OFFSET: usize = 1;
/// Offset of the first payload float.
pub const PAYLOAD_OFFSET: usize = HEADER_SIZE;

/// Number of payload floats in a Revision A frame.
pub const REVISION_A_PAYLOAD_LEN: usize = 6;
/// Number of payload floats in a Revision B frame.
pub const REVISION_B_PAYLOAD_LEN: usize = 7;

/// Revision A frame size: 1 + 1 + (6 * 4) + 1.
pub const REVISION_A_FRAME_LEN: usize = frame_len(REVISION_A_PAYLOAD_LEN);
/// Revision B frame size: 1 + 1 + (7 * 4) + 1.
pub const REVISION_B_FRAME_LEN: usize = frame_len(REVISION_B_PAYLOAD_LEN);

/// Largest frame of any supported revision.
pub const MAX_FRAME_LEN: usize = REVISION_B_FRAME_LEN;

/// Frame size for a payload of `payload_len` floats.
pub const fn frame_len(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len * FLOAT_SIZE + TRAILER_SIZE
}

// ============================================================================
// CRC-8 Parameters
// ============================================================================

/// Generator polynomial (x^8 + x^2 + x + 1), normal form.
pub const CRC8_POLY: u8 = 0x07;
/// Initial register value.
pub const CRC8_INIT: u8 = 0x00;
/// Value XORed into the register on finalize.
pub const CRC8_XOR_OUT: u8 = 0x00;
/// Checksum of the ASCII string `"123456789"`.
pub const CRC8_CHECK: u8 = 0xF4;

// ============================================================================
// I2C
// ============================================================================

/// Highest valid 7-bit I2C address.
pub const MAX_I2C_ADDRESS: u8 = 0x7F;
