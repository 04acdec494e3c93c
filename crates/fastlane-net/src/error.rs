//! Error types for the networking crate.

use std::io;

use thiserror::Error;

/// Network-specific errors.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Binding the UDP socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The listener is already bound or binding.
    #[error("listener is already running")]
    AlreadyRunning,

    /// Configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<toml::de::Error> for NetworkError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
