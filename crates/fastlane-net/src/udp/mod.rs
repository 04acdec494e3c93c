//! Datagram transport: session attribution, connect handshake, fast senders.
//!
//! This module provides:
//! - **UdpDispatcher**: attributes datagrams to sessions and synthesizes the
//!   CONNECT handshake
//! - **UdpListener**: one receiving channel feeding a shared dispatcher
//! - **UdpFastSender**: best-effort sender bound to a client address
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fastlane_core::{BinaryCodec, DefaultSession, InMemorySessionRegistry, SessionRegistry};
//! use fastlane_net::udp::{UdpDispatcher, UdpListener, UdpListenerConfig};
//!
//! let registry = Arc::new(InMemorySessionRegistry::new());
//! let dispatcher = Arc::new(UdpDispatcher::new(registry.clone(), Arc::new(BinaryCodec::new())));
//!
//! // Login over the reliable transport told us where the client's datagrams come from.
//! let (session, mut events) = DefaultSession::new();
//! registry.bind(client_udp_addr, session.clone());
//!
//! let listener = UdpListener::new(UdpListenerConfig::new("0.0.0.0", 18090), dispatcher);
//! listener.bind().await?;
//!
//! // First datagram from the client arrives as a CONNECT with a fast sender.
//! let connect = events.recv().await;
//! ```
//!
//! # Multiple Channels
//!
//! ```ignore
//! let a = UdpListener::new(UdpListenerConfig::any_address(18090), dispatcher.clone());
//! let b = UdpListener::new(UdpListenerConfig::any_address(18091), dispatcher.clone());
//! a.bind().await?;
//! b.bind().await?;
//! ```

mod channel;
mod config;
mod datagram;
mod dispatcher;
mod listener;
mod sender;
mod state;
mod stats;

pub use channel::DatagramChannel;
pub use config::UdpListenerConfig;
pub use datagram::{Datagram, DatagramBatch};
pub use dispatcher::{BatchSummary, Dispatch, UdpDispatcher};
pub use listener::UdpListener;
pub use sender::{FastSenderFactory, UdpFastSender, UdpSenderFactory};
pub use state::UdpListenerState;
pub use stats::{DispatchStats, DispatchStatsSnapshot};
