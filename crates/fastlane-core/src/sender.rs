//! The fast (unreliable, low-latency) sender capability.

use std::fmt;
use std::net::SocketAddr;

use crate::error::SendError;
use crate::event::Event;

/// A best-effort sender bound to one remote address.
///
/// Senders are handed to a session inside a CONNECT event. Delivery is not
/// acknowledged, ordered or retried.
pub trait FastSender: Send + Sync + fmt::Debug {
    /// The remote address datagrams are sent to.
    fn remote_addr(&self) -> SocketAddr;

    /// Encode and send an event as a single datagram.
    fn send(&self, event: &Event) -> Result<(), SendError>;

    /// Close the sender. Closing twice is a no-op.
    fn close(&self);

    /// Whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}
