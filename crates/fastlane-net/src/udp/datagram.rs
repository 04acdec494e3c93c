//! Received datagrams and receive batches.

use std::io;
use std::net::SocketAddr;

use bytes::Bytes;
use fastlane_core::logging::targets;

/// A received datagram with its source address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datagram {
    /// The datagram payload.
    pub data: Bytes,
    /// The source address of the datagram.
    pub source: SocketAddr,
}

impl Datagram {
    /// Create a new datagram.
    pub fn new(data: impl Into<Bytes>, source: SocketAddr) -> Self {
        Self {
            data: data.into(),
            source,
        }
    }
}

/// All datagrams delivered by one receive pass.
///
/// The batch owns its buffers. [`UdpDispatcher::dispatch_batch`] takes it by
/// value, so every datagram is either forwarded or discarded before the
/// buffers are released, and they are released exactly once.
///
/// [`UdpDispatcher::dispatch_batch`]: super::UdpDispatcher::dispatch_batch
#[derive(Debug, Default)]
pub struct DatagramBatch {
    datagrams: Vec<Datagram>,
}

impl DatagramBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty batch with room for `capacity` datagrams.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            datagrams: Vec::with_capacity(capacity),
        }
    }

    /// Append a datagram.
    pub fn push(&mut self, datagram: Datagram) {
        self.datagrams.push(datagram);
    }

    /// Number of datagrams in the batch.
    pub fn len(&self) -> usize {
        self.datagrams.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.datagrams.is_empty()
    }

    /// Iterate over the datagrams in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Datagram> {
        self.datagrams.iter()
    }

    /// Release the batch and its buffers.
    pub fn release(self) {
        drop(self);
    }

    /// Drain whatever is immediately readable on `socket`, up to `max` datagrams.
    ///
    /// Datagrams longer than `limit` are discarded; `buffer` must be longer
    /// than `limit` so they can be told apart from an exact fit.
    ///
    /// Stops at the first `WouldBlock`. Any other receive error is returned
    /// only if nothing was read yet; otherwise the partial batch is kept and
    /// the error will surface on the next readiness poll.
    pub(crate) fn drain(
        socket: &tokio::net::UdpSocket,
        buffer: &mut [u8],
        limit: usize,
        max: usize,
    ) -> io::Result<Self> {
        let mut batch = Self::with_capacity(max.min(64));
        while batch.len() < max {
            match socket.try_recv_from(buffer) {
                Ok((n, source)) if n > limit => {
                    tracing::warn!(
                        target: targets::LISTENER,
                        %source,
                        limit,
                        "datagram exceeds receive buffer, discarding"
                    );
                }
                Ok((n, source)) => {
                    batch.push(Datagram::new(Bytes::copy_from_slice(&buffer[..n]), source));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if batch.is_empty() => return Err(e),
                Err(_) => break,
            }
        }
        Ok(batch)
    }
}

impl<'a> IntoIterator for &'a DatagramBatch {
    type Item = &'a Datagram;
    type IntoIter = std::slice::Iter<'a, Datagram>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Datagram> for DatagramBatch {
    fn from_iter<I: IntoIterator<Item = Datagram>>(iter: I) -> Self {
        Self {
            datagrams: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::UdpSocket;

    use super::*;

    #[tokio::test]
    async fn test_drain_discards_oversized_datagrams() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap();
        let source = sender.local_addr().unwrap();

        sender.send_to(&[0x1c; 20], target).await.unwrap();
        sender.send_to(b"\x1cexactly", target).await.unwrap();
        sender.send_to(b"\x1cok", target).await.unwrap();

        let mut buffer = vec![0u8; 9];
        let mut received = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), async {
            while received.len() < 2 {
                receiver.readable().await.unwrap();
                let batch = DatagramBatch::drain(&receiver, &mut buffer, 8, 32).unwrap();
                received.extend(batch.iter().cloned());
            }
        })
        .await
        .expect("datagrams within limit arrive");

        assert_eq!(
            received,
            vec![
                Datagram::new(&b"\x1cexactly"[..], source),
                Datagram::new(&b"\x1cok"[..], source),
            ]
        );
    }
}
