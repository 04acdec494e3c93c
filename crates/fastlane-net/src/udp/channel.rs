//! The receiving channel a fast sender writes back through.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// A datagram endpoint that can send without blocking.
///
/// Fast senders reply through the same channel the client's datagrams
/// arrived on, so the client sees a consistent source address.
pub trait DatagramChannel: Send + Sync + fmt::Debug {
    /// Send `buf` to `target`, failing with `WouldBlock` instead of waiting.
    fn try_send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Local address of the channel.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl DatagramChannel for tokio::net::UdpSocket {
    fn try_send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        tokio::net::UdpSocket::try_send_to(self, buf, target)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        tokio::net::UdpSocket::local_addr(self)
    }
}
