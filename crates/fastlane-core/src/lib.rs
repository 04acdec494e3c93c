//! Core types for Fastlane.
//!
//! Fastlane binds sessions created over a reliable transport to a datagram
//! (fast, unreliable) transport. This crate holds the pieces shared by every
//! transport:
//!
//! - **Events**: the closed [`Event`] enum and its [`EventType`] opcodes
//! - **Codec**: [`EventCodec`] and the default [`BinaryCodec`]
//! - **Sessions**: the [`Session`] contract and [`DefaultSession`]
//! - **Handshake**: [`HandshakeCell`], an atomic `Disconnected -> Handshaking
//!   -> Connected` state machine
//! - **Registry**: [`SessionRegistry`] address lookup and
//!   [`InMemorySessionRegistry`]
//! - **Fast senders**: the [`FastSender`] capability carried by CONNECT events
//!
//! # Example
//!
//! ```
//! use std::net::SocketAddr;
//! use fastlane_core::{DefaultSession, InMemorySessionRegistry, Session, SessionRegistry};
//!
//! let registry = InMemorySessionRegistry::new();
//! let (session, _events) = DefaultSession::new();
//!
//! let client: SocketAddr = "192.168.1.50:6000".parse().unwrap();
//! registry.bind(client, session.clone());
//!
//! assert!(registry.lookup(client).is_some());
//! assert!(!session.is_fast_transport_enabled());
//! ```

mod codec;
mod error;
mod event;
mod handshake;
pub mod logging;
mod registry;
mod sender;
mod session;

pub use codec::{BinaryCodec, DEFAULT_MAX_PAYLOAD, DecodeContext, EventCodec, MAX_DATAGRAM_SIZE};
pub use error::{DecodeError, EncodeError, SendError};
pub use event::{ConnectEvent, Event, EventType, Payload};
pub use handshake::{HANDSHAKE_ATTRIBUTE, HandshakeBegin, HandshakeCell, HandshakeState};
pub use registry::{InMemorySessionRegistry, SessionRegistry};
pub use sender::FastSender;
pub use session::{DefaultSession, Session, SessionId};
