//! Configuration types for UDP listeners.

use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Configuration for a UDP listener.
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// bind_address = "0.0.0.0"
/// port = 18090
/// recv_buffer_size = 2048
/// max_batch_size = 64
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UdpListenerConfig {
    /// The address to bind to.
    pub bind_address: String,
    /// The port to bind to. Use 0 for an OS-assigned port.
    pub port: u16,
    /// Enable broadcast mode.
    pub broadcast: bool,
    /// Receive buffer size in bytes. Longer datagrams are discarded.
    pub recv_buffer_size: usize,
    /// Maximum number of datagrams drained into one batch.
    pub max_batch_size: usize,
}

impl Default for UdpListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 0,
            broadcast: false,
            recv_buffer_size: 65535,
            max_batch_size: 32,
        }
    }
}

impl UdpListenerConfig {
    /// Create a new configuration that binds to the specified address and port.
    pub fn new(bind_address: impl Into<String>, port: u16) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            ..Default::default()
        }
    }

    /// Create a configuration that binds to any address on the specified port.
    pub fn any_address(port: u16) -> Self {
        Self::new("0.0.0.0", port)
    }

    /// Enable broadcast mode.
    pub fn broadcast(mut self, enabled: bool) -> Self {
        self.broadcast = enabled;
        self
    }

    /// Set the receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Set the maximum number of datagrams per batch. Clamped to at least 1.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    /// Get the bind address string (address:port).
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.max_batch_size = config.max_batch_size.max(1);
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}
