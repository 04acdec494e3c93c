//! Conversion between raw datagram bytes and [`Event`]s.
//!
//! # Wire format
//!
//! ```text
//! +--------+-------------------------+
//! | opcode | payload (rest of bytes) |
//! +--------+-------------------------+
//! ```
//!
//! Control events (CONNECT, RECONNECT, LOG_OUT, DISCONNECT) ignore any
//! trailing bytes; the other types keep them as their payload.

use std::net::SocketAddr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::event::{ConnectEvent, Event, EventType, Payload};

/// Largest IPv4 UDP payload (65 535 - 8 byte UDP header - 20 byte IP header).
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Default payload limit: one datagram minus the opcode byte.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_DATAGRAM_SIZE - 1;

/// Envelope information available while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeContext {
    /// Transport address the datagram came from.
    pub source: SocketAddr,
}

impl DecodeContext {
    /// Create a context for a datagram from `source`.
    pub fn new(source: SocketAddr) -> Self {
        Self { source }
    }
}

/// Encoder/decoder for events.
///
/// Implementations must copy whatever they keep out of `raw`; the caller
/// releases the receive buffer once the batch is done.
pub trait EventCodec: Send + Sync {
    /// Decode one datagram into an event.
    fn decode(&self, ctx: &DecodeContext, raw: &[u8]) -> Result<Event, DecodeError>;

    /// Encode an event into one datagram.
    fn encode(&self, event: &Event) -> Result<Bytes, EncodeError>;
}

/// The default opcode-prefixed binary codec.
#[derive(Clone, Copy, Debug)]
pub struct BinaryCodec {
    max_payload: usize,
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl BinaryCodec {
    /// Create a codec with the default payload limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum payload size in bytes.
    pub fn max_payload(mut self, max: usize) -> Self {
        self.max_payload = max;
        self
    }

    /// The configured payload limit.
    pub fn payload_limit(&self) -> usize {
        self.max_payload
    }
}

impl EventCodec for BinaryCodec {
    fn decode(&self, _ctx: &DecodeContext, raw: &[u8]) -> Result<Event, DecodeError> {
        let (&opcode, body) = raw.split_first().ok_or(DecodeError::Empty)?;
        let kind = EventType::from_opcode(opcode).ok_or(DecodeError::UnknownOpcode(opcode))?;

        if kind.has_payload() && body.len() > self.max_payload {
            return Err(DecodeError::PayloadTooLarge {
                kind,
                len: body.len(),
                max: self.max_payload,
            });
        }

        let event = match kind {
            EventType::Connect => Event::Connect(ConnectEvent::default()),
            EventType::Reconnect => Event::Reconnect,
            EventType::LogIn => Event::LogIn(Payload::copy_from_slice(body)),
            EventType::LogOut => Event::LogOut,
            EventType::SessionMessage => Event::SessionMessage(Payload::copy_from_slice(body)),
            EventType::NetworkMessage => Event::NetworkMessage(Payload::copy_from_slice(body)),
            EventType::Disconnect => Event::Disconnect,
        };
        Ok(event)
    }

    fn encode(&self, event: &Event) -> Result<Bytes, EncodeError> {
        let kind = event.event_type();
        let payload = event.payload().map(Payload::as_bytes).unwrap_or_default();
        if payload.len() > self.max_payload {
            return Err(EncodeError::PayloadTooLarge {
                kind,
                len: payload.len(),
                max: self.max_payload,
            });
        }

        let mut buf = BytesMut::with_capacity(1 + payload.len());
        buf.put_u8(kind.opcode());
        buf.put_slice(payload);
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DecodeContext {
        DecodeContext::new("127.0.0.1:4000".parse().unwrap())
    }

    #[test]
    fn decode_session_message_copies_payload() {
        let codec = BinaryCodec::new();
        let mut raw = vec![0x1c];
        raw.extend_from_slice(b"CHAT hello");

        let event = codec.decode(&ctx(), &raw).unwrap();
        raw.fill(0);

        assert_eq!(event, Event::SessionMessage(Payload::from("CHAT hello")));
    }

    #[test]
    fn decode_connect_has_no_sender() {
        let codec = BinaryCodec::new();
        let event = codec.decode(&ctx(), &[0x02, 0xaa, 0xbb]).unwrap();
        assert!(event.is_connect());
        assert!(event.sender().is_none());
    }

    #[test]
    fn decode_rejects_empty_and_unknown() {
        let codec = BinaryCodec::new();
        assert_eq!(codec.decode(&ctx(), &[]), Err(DecodeError::Empty));
        assert_eq!(
            codec.decode(&ctx(), &[0x7f, 1, 2]),
            Err(DecodeError::UnknownOpcode(0x7f))
        );
    }

    #[test]
    fn decode_enforces_payload_limit() {
        let codec = BinaryCodec::new().max_payload(4);
        assert!(codec.decode(&ctx(), &[0x1d, 1, 2, 3, 4]).is_ok());
        assert_eq!(
            codec.decode(&ctx(), &[0x1d, 1, 2, 3, 4, 5]),
            Err(DecodeError::PayloadTooLarge {
                kind: EventType::NetworkMessage,
                len: 5,
                max: 4,
            })
        );
        // Control events drop their trailing bytes instead of failing.
        assert_eq!(
            codec.decode(&ctx(), &[0x22, 1, 2, 3, 4, 5]),
            Ok(Event::Disconnect)
        );
    }

    #[test]
    fn encode_layout() {
        let codec = BinaryCodec::new();
        let bytes = codec
            .encode(&Event::NetworkMessage(Payload::from("hi")))
            .unwrap();
        assert_eq!(&bytes[..], &[0x1d, b'h', b'i']);

        let bytes = codec.encode(&Event::Connect(ConnectEvent::default())).unwrap();
        assert_eq!(&bytes[..], &[0x02]);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let codec = BinaryCodec::new().max_payload(1);
        let err = codec
            .encode(&Event::LogIn(Payload::from("secret")))
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::PayloadTooLarge {
                kind: EventType::LogIn,
                len: 6,
                max: 1,
            }
        );
    }
}
