//! Controller-side session.
//!
//! A [`Controller`] owns a bus transport and exchanges CRUMBS frames of one
//! revision with peripherals on it. It has no retry logic: a failed
//! exchange is reported once and the caller decides what to do next.

use std::marker::PhantomData;

use crumbs_protocol::{decode, encode, DecodedFrame, Message, Revision, MAX_I2C_ADDRESS};
use tracing::{debug, info, warn};

use crate::error::{HostError, HostResult};
use crate::transport::FrameTransport;

/// Check that `address` is a 7-bit I2C address.
pub fn validate_address(address: u8) -> HostResult<u8> {
    if address > MAX_I2C_ADDRESS {
        return Err(HostError::InvalidAddress(address));
    }
    Ok(address)
}

/// Bus controller for frames of revision `R`.
#[derive(Debug)]
pub struct Controller<T, R> {
    transport: T,
    _revision: PhantomData<R>,
}

impl<T, R> Controller<T, R>
where
    T: FrameTransport,
    R: Revision,
{
    /// Create a controller over an open transport.
    pub fn new(transport: T) -> Self {
        info!(revision = %R::REVISION, frame_len = R::FRAME_LEN, "CRUMBS controller ready");
        Controller {
            transport,
            _revision: PhantomData,
        }
    }

    /// Encode `message` and write it to the peripheral at `address`.
    pub fn send_message(&mut self, message: &Message<R>, address: u8) -> HostResult<()> {
        validate_address(address)?;
        let frame = encode(message);
        debug!(
            address,
            frame = %hex::encode(frame.as_ref()),
            "sending frame"
        );
        self.transport
            .write_frame(address, frame.as_ref())
            .map_err(|e| HostError::transport(address, format!("{:?}", e)))?;
        info!("Message sent to address 0x{:02X}", address);
        Ok(())
    }

    /// Read one frame from the peripheral at `address` and decode it.
    ///
    /// A CRC mismatch is logged but not treated as an error; inspect
    /// [`DecodedFrame::is_intact`] or call [`DecodedFrame::verify`].
    pub fn request_message(&mut self, address: u8) -> HostResult<DecodedFrame<R>> {
        validate_address(address)?;
        let mut frame = R::Frame::default();
        self.transport
            .read_frame(address, frame.as_mut())
            .map_err(|e| HostError::transport(address, format!("{:?}", e)))?;
        info!(
            "Received {} bytes from address 0x{:02X}",
            R::FRAME_LEN,
            address
        );
        debug!(frame = %hex::encode(frame.as_ref()), "received frame");

        let decoded = decode::<R>(frame.as_ref())?;
        if let (false, Some(computed)) = (decoded.is_intact(), decoded.computed_crc) {
            warn!(
                address,
                received = decoded.trailer,
                computed,
                "CRC mismatch in received frame"
            );
        }
        Ok(decoded)
    }

    /// Read a frame and reject it on CRC mismatch.
    pub fn request_verified(&mut self, address: u8) -> HostResult<Message<R>> {
        Ok(self.request_message(address)?.verify()?)
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport, closing the session.
    pub fn into_inner(self) -> T {
        info!("CRUMBS controller closed");
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{SimulatedBus, SimulatedPeripheral};
    use crumbs_protocol::{ErrorFlags, MessageA, MessageB, ProtocolError, RevisionA, RevisionB};

    #[test]
    fn test_send_writes_encoded_frame() {
        let bus = SimulatedBus::new().with_peripheral(0x08, SimulatedPeripheral::new());
        let mut controller: Controller<_, RevisionA> = Controller::new(bus);

        let msg = MessageA::new(1, 1, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0], ErrorFlags(0));
        controller.send_message(&msg, 0x08).unwrap();

        let received = controller.transport().peripheral(0x08).unwrap().received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], encode(&msg).to_vec());
    }

    #[test]
    fn test_request_decodes_queued_frame() {
        let msg = MessageB::new(3, 4, [1.5; 7], ());
        let mut peripheral = SimulatedPeripheral::new();
        peripheral.queue_response(encode(&msg).to_vec());
        let bus = SimulatedBus::new().with_peripheral(0x20, peripheral);
        let mut controller: Controller<_, RevisionB> = Controller::new(bus);

        let decoded = controller.request_message(0x20).unwrap();
        assert!(decoded.is_intact());
        assert_eq!(decoded.message, msg);
    }

    #[test]
    fn test_request_returns_corrupted_frame() {
        let msg = MessageB::new(3, 4, [1.5; 7], ());
        let mut frame = encode(&msg);
        frame[30] ^= 0x01;
        let mut peripheral = SimulatedPeripheral::new();
        peripheral.queue_response(frame.to_vec());
        peripheral.queue_response(frame.to_vec());
        let bus = SimulatedBus::new().with_peripheral(0x20, peripheral);
        let mut controller: Controller<_, RevisionB> = Controller::new(bus);

        let decoded = controller.request_message(0x20).unwrap();
        assert!(!decoded.is_intact());

        let err = controller.request_verified(0x20).unwrap_err();
        assert!(matches!(
            err,
            HostError::Protocol(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_device_is_transport_error() {
        let mut controller: Controller<_, RevisionB> = Controller::new(SimulatedBus::new());
        let err = controller
            .send_message(&MessageB::default(), 0x30)
            .unwrap_err();
        assert!(matches!(err, HostError::Transport { address: 0x30, .. }));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let mut controller: Controller<_, RevisionB> = Controller::new(SimulatedBus::new());
        let err = controller.request_message(0x80).unwrap_err();
        assert!(matches!(err, HostError::InvalidAddress(0x80)));
    }
}
