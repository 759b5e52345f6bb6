//! CRUMBS Host
//!
//! Controller-side library for talking to CRUMBS peripherals over I2C. The
//! frame codec lives in [`crumbs_protocol`]; this crate adds the pieces a
//! host application needs around it:
//!
//! - [`FrameTransport`]: the byte-level bus seam, implemented for every
//!   `embedded-hal` I2C bus and by the in-memory [`SimulatedBus`]
//! - [`Controller`]: send and request messages of one frame revision
//! - [`HostConfig`]: YAML configuration
//! - [`LeaderCommand`]: the interactive leader's line format
//!
//! # Example
//!
//! ```rust
//! use crumbs_host::{Controller, SimulatedBus, SimulatedPeripheral};
//! use crumbs_protocol::{MessageB, RevisionB};
//!
//! let bus = SimulatedBus::new().with_peripheral(0x08, SimulatedPeripheral::echo());
//! let mut controller: Controller<_, RevisionB> = Controller::new(bus);
//!
//! let msg = MessageB::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0, 0.0], ());
//! controller.send_message(&msg, 0x08)?;
//! let reply = controller.request_verified(0x08)?;
//! assert_eq!(reply, msg);
//! # Ok::<(), crumbs_host::HostError>(())
//! ```

pub mod command;
pub mod config;
pub mod controller;
pub mod logging;
pub mod transport;

mod error;

pub use command::{parse_address, usage, LeaderCommand};
pub use config::HostConfig;
pub use controller::{validate_address, Controller};
pub use error::{HostError, HostResult};
pub use transport::{FrameTransport, SimulatedBus, SimulatedError, SimulatedPeripheral};

#[cfg(feature = "linux")]
pub use transport::open_linux_bus;
