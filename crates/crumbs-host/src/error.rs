//! Error types for the CRUMBS host.

use crumbs_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur when talking to CRUMBS peripherals.
#[derive(Debug, Error)]
pub enum HostError {
    /// Frame encoding, decoding or verification failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The bus collaborator reported a failure.
    #[error("transport error at address 0x{address:02X}: {message}")]
    Transport {
        /// Target I2C address.
        address: u8,
        /// Description from the bus driver.
        message: String,
    },

    /// Not a 7-bit I2C address.
    #[error("invalid I2C address 0x{0:02X}: must be at most 0x7F")]
    InvalidAddress(u8),

    /// A leader command line could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid host configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error reading configuration or the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HostError {
    /// Create a transport error for `address`.
    pub fn transport(address: u8, message: impl Into<String>) -> Self {
        HostError::Transport {
            address,
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        HostError::Parse(message.into())
    }
}

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
