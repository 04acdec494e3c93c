//! Decoded events exchanged between the transports and a session.
//!
//! Events form a closed set. The dispatcher only distinguishes
//! [`Event::Connect`] from everything else, but matching on [`Event`] is
//! exhaustive so new kinds have to be handled everywhere at compile time.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::sender::FastSender;

/// Type tag of an event, with its single-byte wire opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    /// A fast sender is (or should become) available for the session.
    Connect = 0x02,
    /// The client asks to resume an earlier session.
    Reconnect = 0x03,
    /// Login request carrying credentials.
    LogIn = 0x08,
    /// Logout request.
    LogOut = 0x0a,
    /// Application message scoped to the session.
    SessionMessage = 0x1c,
    /// Application message broadcast over the network layer.
    NetworkMessage = 0x1d,
    /// The session is going away.
    Disconnect = 0x22,
}

impl EventType {
    /// Every event type, in opcode order.
    pub const ALL: [EventType; 7] = [
        Self::Connect,
        Self::Reconnect,
        Self::LogIn,
        Self::LogOut,
        Self::SessionMessage,
        Self::NetworkMessage,
        Self::Disconnect,
    ];

    /// Look up the event type for a wire opcode.
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.opcode() == opcode)
    }

    /// The wire opcode of this type.
    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Whether events of this type carry a payload on the wire.
    pub fn has_payload(self) -> bool {
        matches!(
            self,
            Self::LogIn | Self::SessionMessage | Self::NetworkMessage
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "CONNECT"),
            Self::Reconnect => write!(f, "RECONNECT"),
            Self::LogIn => write!(f, "LOG_IN"),
            Self::LogOut => write!(f, "LOG_OUT"),
            Self::SessionMessage => write!(f, "SESSION_MESSAGE"),
            Self::NetworkMessage => write!(f, "NETWORK_MESSAGE"),
            Self::Disconnect => write!(f, "DISCONNECT"),
        }
    }
}

/// Owned event payload.
///
/// The bytes never alias a receive buffer; codecs copy on decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload(Bytes);

impl Payload {
    /// Create a payload by copying the given bytes.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Borrow the payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying [`Bytes`].
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<&'static str> for Payload {
    fn from(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }
}

/// Body of a CONNECT event.
///
/// A CONNECT decoded off the wire has no sender; one synthesized by the
/// dispatcher carries the fast sender bound to the client's address.
#[derive(Clone, Debug, Default)]
pub struct ConnectEvent {
    sender: Option<Arc<dyn FastSender>>,
}

impl ConnectEvent {
    /// A CONNECT carrying a fast sender.
    pub fn with_sender(sender: Arc<dyn FastSender>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// The attached fast sender, if any.
    pub fn sender(&self) -> Option<&Arc<dyn FastSender>> {
        self.sender.as_ref()
    }
}

impl PartialEq for ConnectEvent {
    fn eq(&self, other: &Self) -> bool {
        match (&self.sender, &other.sender) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A decoded, immutable event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Fast transport handshake.
    Connect(ConnectEvent),
    /// Session resume request.
    Reconnect,
    /// Login with a credential payload.
    LogIn(Payload),
    /// Logout request.
    LogOut,
    /// Session-scoped application message.
    SessionMessage(Payload),
    /// Network-scoped application message.
    NetworkMessage(Payload),
    /// Session teardown.
    Disconnect,
}

impl Event {
    /// Build a CONNECT event around a fast sender.
    pub fn connect(sender: Arc<dyn FastSender>) -> Self {
        Self::Connect(ConnectEvent::with_sender(sender))
    }

    /// The type tag of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Connect(_) => EventType::Connect,
            Self::Reconnect => EventType::Reconnect,
            Self::LogIn(_) => EventType::LogIn,
            Self::LogOut => EventType::LogOut,
            Self::SessionMessage(_) => EventType::SessionMessage,
            Self::NetworkMessage(_) => EventType::NetworkMessage,
            Self::Disconnect => EventType::Disconnect,
        }
    }

    /// Whether this is a CONNECT event.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }

    /// The payload, for event types that carry one.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::LogIn(payload) | Self::SessionMessage(payload) | Self::NetworkMessage(payload) => {
                Some(payload)
            }
            Self::Connect(_) | Self::Reconnect | Self::LogOut | Self::Disconnect => None,
        }
    }

    /// The fast sender attached to a CONNECT event.
    pub fn sender(&self) -> Option<&Arc<dyn FastSender>> {
        match self {
            Self::Connect(connect) => connect.sender(),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(payload) => write!(f, "{}({} bytes)", self.event_type(), payload.len()),
            None => write!(f, "{}", self.event_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_round_trip_through_lookup() {
        for kind in EventType::ALL {
            assert_eq!(EventType::from_opcode(kind.opcode()), Some(kind));
        }
        assert_eq!(EventType::from_opcode(0x00), None);
        assert_eq!(EventType::from_opcode(0xff), None);
    }

    #[test]
    fn event_type_display() {
        assert_eq!(EventType::Connect.to_string(), "CONNECT");
        assert_eq!(EventType::SessionMessage.to_string(), "SESSION_MESSAGE");
        assert_eq!(EventType::Disconnect.to_string(), "DISCONNECT");
    }

    #[test]
    fn payload_accessors() {
        let event = Event::SessionMessage(Payload::from("MOVE 3 4"));
        assert_eq!(event.event_type(), EventType::SessionMessage);
        assert!(!event.is_connect());
        assert_eq!(event.payload().map(Payload::as_bytes), Some(&b"MOVE 3 4"[..]));
        assert_eq!(event.to_string(), "SESSION_MESSAGE(8 bytes)");

        assert!(Event::Disconnect.payload().is_none());
        assert!(Event::Connect(ConnectEvent::default()).is_connect());
        assert!(Event::Connect(ConnectEvent::default()).sender().is_none());
    }
}
