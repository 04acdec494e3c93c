//! Error types for Fastlane core operations.

use std::io;

use thiserror::Error;

use crate::event::EventType;

/// Errors produced while turning a raw datagram into an [`Event`](crate::Event).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The datagram carried no bytes at all.
    #[error("empty datagram")]
    Empty,

    /// The leading opcode byte does not name a known event type.
    #[error("unknown event opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    /// The payload exceeds the codec's configured limit.
    #[error("{kind} payload of {len} bytes exceeds limit of {max}")]
    PayloadTooLarge {
        /// Event type announced by the opcode.
        kind: EventType,
        /// Actual payload length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Errors produced while encoding an event for the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload does not fit into a single datagram.
    #[error("{kind} payload of {len} bytes exceeds limit of {max}")]
    PayloadTooLarge {
        /// Event type being encoded.
        kind: EventType,
        /// Actual payload length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Errors returned when sending over a fast transport.
#[derive(Error, Debug)]
pub enum SendError {
    /// The session has no fast sender bound yet.
    #[error("fast transport is not connected")]
    NotConnected,

    /// The sender was closed.
    #[error("fast sender is closed")]
    Closed,

    /// Encoding the event failed.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The underlying datagram channel reported an error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
