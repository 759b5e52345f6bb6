//! CRUMBS Frame Protocol
//!
//! This crate provides the codec for CRUMBS messages, the fixed-size binary
//! frames a host exchanges with microcontroller peripherals over I2C. Every
//! frame carries a type ID, a command type, a fixed number of little-endian
//! `f32` payload values and one trailing check byte.
//!
//! # Protocol Overview
//!
//! Two incompatible revisions of the wire format exist:
//!
//! - **Revision A**: 27 bytes, 6 floats, trailing error-flags bitmap
//! - **Revision B**: 31 bytes, 7 floats, trailing CRC-8 over the first 30 bytes
//!
//! The revision is chosen by configuration on both ends and selected here by
//! type ([`RevisionA`], [`RevisionB`]) or at runtime by [`FrameRevision`].
//!
//! # Example
//!
//! ```rust
//! use crumbs_protocol::{decode, encode, MessageB, RevisionB};
//!
//! let msg = MessageB::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0, 0.0], ());
//! let frame = encode(&msg);
//! assert_eq!(frame.len(), 31);
//!
//! let decoded = decode::<RevisionB>(&frame)?;
//! assert!(decoded.is_intact());
//! assert_eq!(decoded.message, msg);
//! # Ok::<(), crumbs_protocol::ProtocolError>(())
//! ```

pub mod crc;

mod codec;
mod constants;
mod error;
mod message;
mod revision;

pub use codec::*;
pub use constants::*;
pub use error::*;
pub use message::*;
pub use revision::*;
