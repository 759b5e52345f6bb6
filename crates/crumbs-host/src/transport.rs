//! Bus transport.
//!
//! The codec only produces and consumes fixed-length byte buffers. Moving
//! those buffers across the bus is the job of a [`FrameTransport`]. Every
//! `embedded-hal` I2C bus is one, so a Linux `/dev/i2c-*` device, a USB
//! bridge or a microcontroller HAL all plug in unchanged.
//!
//! [`SimulatedBus`] is an in-memory bus used by tests and by `crumbs
//! --simulate`.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};
use thiserror::Error;

// ============================================================================
// Transport Trait
// ============================================================================

/// Byte-level access to peripherals on a bus.
pub trait FrameTransport {
    /// Error reported by the bus.
    type Error: fmt::Debug;

    /// Write `bytes` to the peripheral at `address`.
    fn write_frame(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Read exactly `buf.len()` bytes from the peripheral at `address`.
    fn read_frame(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T> FrameTransport for T
where
    T: I2c<SevenBitAddress>,
{
    type Error = T::Error;

    fn write_frame(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write(address, bytes)
    }

    fn read_frame(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.read(address, buf)
    }
}

/// Open a Linux I2C character device such as `/dev/i2c-1`.
#[cfg(feature = "linux")]
pub fn open_linux_bus(
    path: impl AsRef<std::path::Path>,
) -> crate::HostResult<linux_embedded_hal::I2cdev> {
    let path = path.as_ref();
    linux_embedded_hal::I2cdev::new(path)
        .map_err(|e| crate::HostError::Config(format!("cannot open {}: {}", path.display(), e)))
}

// ============================================================================
// Simulated Bus
// ============================================================================

/// Errors reported by [`SimulatedBus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatedError {
    /// No peripheral is registered at the address.
    #[error("no device at address 0x{0:02X}")]
    NoDevice(u8),

    /// The peripheral has nothing queued to send.
    #[error("device 0x{0:02X} has no response queued")]
    NoResponse(u8),

    /// The queued response does not fit the read request.
    #[error("device 0x{address:02X} response is {actual} bytes, read requested {expected}")]
    ResponseLength {
        /// Peripheral address.
        address: u8,
        /// Bytes requested by the controller.
        expected: usize,
        /// Bytes queued by the peripheral.
        actual: usize,
    },
}

impl i2c::Error for SimulatedError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimulatedError::NoDevice(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            SimulatedError::NoResponse(_) | SimulatedError::ResponseLength { .. } => {
                ErrorKind::Other
            }
        }
    }
}

/// A peripheral attached to a [`SimulatedBus`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedPeripheral {
    received: Vec<Vec<u8>>,
    responses: VecDeque<Vec<u8>>,
    echo: bool,
}

impl SimulatedPeripheral {
    /// Peripheral that only answers with queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Peripheral that answers a read with the last frame written to it
    /// when nothing else is queued.
    pub fn echo() -> Self {
        SimulatedPeripheral {
            echo: true,
            ..Self::default()
        }
    }

    /// Queue a response for the next read.
    pub fn queue_response(&mut self, bytes: impl Into<Vec<u8>>) {
        self.responses.push_back(bytes.into());
    }

    /// Frames written to this peripheral, oldest first.
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    fn next_response(&mut self) -> Option<Vec<u8>> {
        self.responses.pop_front().or_else(|| {
            if self.echo {
                self.received.last().cloned()
            } else {
                None
            }
        })
    }
}

/// In-memory I2C bus with registered peripherals.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBus {
    peripherals: HashMap<u8, SimulatedPeripheral>,
}

impl SimulatedBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a peripheral at `address`, replacing any existing one.
    pub fn attach(&mut self, address: u8, peripheral: SimulatedPeripheral) {
        self.peripherals.insert(address, peripheral);
    }

    /// Builder form of [`attach`](Self::attach).
    pub fn with_peripheral(mut self, address: u8, peripheral: SimulatedPeripheral) -> Self {
        self.attach(address, peripheral);
        self
    }

    /// Peripheral at `address`.
    pub fn peripheral(&self, address: u8) -> Option<&SimulatedPeripheral> {
        self.peripherals.get(&address)
    }

    /// Mutable peripheral at `address`.
    pub fn peripheral_mut(&mut self, address: u8) -> Option<&mut SimulatedPeripheral> {
        self.peripherals.get_mut(&address)
    }

    fn device(&mut self, address: u8) -> Result<&mut SimulatedPeripheral, SimulatedError> {
        self.peripherals
            .get_mut(&address)
            .ok_or(SimulatedError::NoDevice(address))
    }
}

impl i2c::ErrorType for SimulatedBus {
    type Error = SimulatedError;
}

impl I2c<SevenBitAddress> for SimulatedBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let device = self.device(address)?;
        for operation in operations {
            match operation {
                Operation::Write(bytes) => device.received.push(bytes.to_vec()),
                Operation::Read(buf) => {
                    let response = device
                        .next_response()
                        .ok_or(SimulatedError::NoResponse(address))?;
                    if response.len() != buf.len() {
                        return Err(SimulatedError::ResponseLength {
                            address,
                            expected: buf.len(),
                            actual: response.len(),
                        });
                    }
                    buf.copy_from_slice(&response);
                }
            }
        }
        Ok(())
    }
}
