//! Networking module for Fastlane.
//!
//! Sessions in Fastlane are created over a reliable transport and later
//! bound to a datagram address for low-latency traffic. This crate provides
//! the datagram side:
//!
//! - **Dispatch**: looks up the session for each datagram's source address,
//!   decodes it and applies the connect handshake policy
//! - **Handshake**: the first datagram from a bound but not yet connected
//!   address becomes a CONNECT event carrying a [`udp::UdpFastSender`]
//! - **Listener**: tokio UDP receive loop delivering datagrams in batches
//!
//! # Dispatch Policy
//!
//! | Session            | Fast transport | Event      | Outcome                         |
//! |--------------------|----------------|------------|---------------------------------|
//! | none               | -              | -          | dropped, trace log              |
//! | found              | disconnected   | any        | CONNECT synthesized, delivered  |
//! | found              | handshaking    | any        | dropped, info log               |
//! | found              | connected      | CONNECT    | dropped, trace log              |
//! | found              | connected      | other      | delivered unchanged             |
//!
//! Undecodable datagrams are dropped with a warning. No outcome stops the
//! rest of the batch and nothing is retried.
//!
//! # Configuration
//!
//! ```ignore
//! use fastlane_net::udp::UdpListenerConfig;
//!
//! let config = UdpListenerConfig::new("0.0.0.0", 18090)
//!     .recv_buffer_size(2048)
//!     .max_batch_size(64);
//!
//! // or from a file
//! let config = UdpListenerConfig::load("fastlane.toml")?;
//! ```

mod error;
pub mod udp;

pub use error::{NetworkError, Result};

// Re-export commonly used types at the crate root
pub use udp::{
    Datagram, DatagramBatch, DatagramChannel, Dispatch, FastSenderFactory, UdpDispatcher,
    UdpFastSender, UdpListener, UdpListenerConfig, UdpListenerState, UdpSenderFactory,
};
