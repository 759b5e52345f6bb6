//! Host configuration.
//!
//! Loaded from YAML, e.g.:
//!
//! ```yaml
//! bus: /dev/i2c-1
//! revision: b
//! default_address: 0x08
//! simulated_peripherals: [0x08, 0x09]
//! ```

use std::path::{Path, PathBuf};

use crumbs_protocol::FrameRevision;
use serde::{Deserialize, Serialize};

use crate::controller::validate_address;
use crate::error::{HostError, HostResult};

/// Default I2C character device (bus 1 on a Raspberry Pi).
pub const DEFAULT_BUS: &str = "/dev/i2c-1";

/// Default peripheral address for the simulated bus.
pub const DEFAULT_SIMULATED_ADDRESS: u8 = 0x08;

/// Configuration for the CRUMBS host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// I2C character device path.
    pub bus: PathBuf,
    /// Wire revision shared with the peripherals.
    pub revision: FrameRevision,
    /// Address used when a command omits one.
    pub default_address: Option<u8>,
    /// Echo peripherals attached in simulation mode.
    pub simulated_peripherals: Vec<u8>,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            bus: PathBuf::from(DEFAULT_BUS),
            revision: FrameRevision::default(),
            default_address: None,
            simulated_peripherals: vec![DEFAULT_SIMULATED_ADDRESS],
        }
    }
}

impl HostConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> HostResult<Self> {
        let config: HostConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HostError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check that every address is a 7-bit I2C address.
    pub fn validate(&self) -> HostResult<()> {
        if let Some(address) = self.default_address {
            validate_address(address)?;
        }
        for &address in &self.simulated_peripherals {
            validate_address(address)?;
        }
        if self.bus.as_os_str().is_empty() {
            return Err(HostError::Config("bus path is empty".to_string()));
        }
        Ok(())
    }
}
