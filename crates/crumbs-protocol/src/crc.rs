//! Nibble-table CRC-8.
//!
//! Reproduces the table-driven CRC-8 used by the CRUMBS peripheral firmware:
//! width 8, poly `0x07`, init `0x00`, no input/output reflection, xorout
//! `0x00`. Each byte is folded in as two 4-bit nibbles against a 16-entry
//! table, matching the peripheral bit-for-bit.
//!
//! The running register is a plain value passed through the call chain, so
//! incremental use across chunks gives the same result as a single call:
//!
//! ```
//! use crumbs_protocol::crc;
//!
//! let state = crc::update(crc::init(), b"1234");
//! let state = crc::update(state, b"56789");
//! assert_eq!(crc::finalize(state), crc::calculate(b"123456789"));
//! assert_eq!(crc::calculate(b"123456789"), 0xF4);
//! ```

use crate::constants::{CRC8_INIT, CRC8_POLY, CRC8_XOR_OUT};

/// 16-entry lookup table, evaluated at compile time.
pub static NIBBLE_TABLE: [u8; 16] = build_nibble_table(CRC8_POLY);

/// Build the table for a normal-form polynomial: entry `i` is the register
/// after shifting nibble `i` (placed in the high half) through four rounds.
const fn build_nibble_table(poly: u8) -> [u8; 16] {
    let mut table = [0u8; 16];
    let mut i = 0;
    while i < 16 {
        let mut reg = (i as u8) << 4;
        let mut bit = 0;
        while bit < 4 {
            reg = if reg & 0x80 != 0 {
                (reg << 1) ^ poly
            } else {
                reg << 1
            };
            bit += 1;
        }
        table[i] = reg;
        i += 1;
    }
    table
}

/// Running CRC-8 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc8(u8);

impl Crc8 {
    /// Register at its initial value.
    pub const fn new() -> Self {
        Crc8(CRC8_INIT)
    }

    /// Fold `data` into the register.
    #[must_use]
    pub fn update(self, data: &[u8]) -> Self {
        let reg = data.iter().fold(self.0, |reg, &byte| {
            let reg = NIBBLE_TABLE[((reg >> 4) ^ (byte >> 4)) as usize & 0x0F] ^ (reg << 4);
            NIBBLE_TABLE[((reg >> 4) ^ byte) as usize & 0x0F] ^ (reg << 4)
        });
        Crc8(reg)
    }

    /// Produce the checksum byte.
    pub const fn finalize(self) -> u8 {
        self.0 ^ CRC8_XOR_OUT
    }

    /// Raw register value.
    pub const fn register(self) -> u8 {
        self.0
    }
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial register.
pub const fn init() -> Crc8 {
    Crc8::new()
}

/// Fold `data` into `state`.
pub fn update(state: Crc8, data: &[u8]) -> Crc8 {
    state.update(data)
}

/// Checksum byte for a register.
pub const fn finalize(state: Crc8) -> u8 {
    state.finalize()
}

/// Checksum of `data`. Empty input yields `finalize(init())`.
pub fn calculate(data: &[u8]) -> u8 {
    if data.is_empty() {
        return finalize(init());
    }
    finalize(update(init(), data))
}
