//! Fast senders bound to a client's datagram address.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fastlane_core::logging::targets;
use fastlane_core::{BinaryCodec, Event, EventCodec, FastSender, SendError, SessionRegistry};

use super::channel::DatagramChannel;

/// Builds the fast sender handed to a session in a synthesized CONNECT.
///
/// Construction must not have global side effects; binding the sender is
/// the session's job when it processes the CONNECT.
pub trait FastSenderFactory: Send + Sync {
    /// Create a sender for `remote` that writes through `channel`.
    fn create(
        &self,
        remote: SocketAddr,
        channel: Arc<dyn DatagramChannel>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Arc<dyn FastSender>;
}

/// The default factory, producing [`UdpFastSender`]s.
#[derive(Clone)]
pub struct UdpSenderFactory {
    codec: Arc<dyn EventCodec>,
}

impl UdpSenderFactory {
    /// Create a factory whose senders encode with `codec`.
    pub fn new(codec: Arc<dyn EventCodec>) -> Self {
        Self { codec }
    }
}

impl Default for UdpSenderFactory {
    fn default() -> Self {
        Self::new(Arc::new(BinaryCodec::new()))
    }
}

impl FastSenderFactory for UdpSenderFactory {
    fn create(
        &self,
        remote: SocketAddr,
        channel: Arc<dyn DatagramChannel>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Arc<dyn FastSender> {
        Arc::new(UdpFastSender::new(
            remote,
            channel,
            registry,
            self.codec.clone(),
        ))
    }
}

impl fmt::Debug for UdpSenderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpSenderFactory").finish_non_exhaustive()
    }
}

/// Best-effort UDP sender for one remote address.
///
/// Sends never wait: a full socket buffer surfaces as an I/O error and the
/// datagram is lost. Closing unbinds the remote address from the registry
/// so later datagrams from it are no longer attributed to the session.
pub struct UdpFastSender {
    remote: SocketAddr,
    channel: Arc<dyn DatagramChannel>,
    registry: Arc<dyn SessionRegistry>,
    codec: Arc<dyn EventCodec>,
    closed: AtomicBool,
}

impl UdpFastSender {
    /// Create a sender. Has no side effects.
    pub fn new(
        remote: SocketAddr,
        channel: Arc<dyn DatagramChannel>,
        registry: Arc<dyn SessionRegistry>,
        codec: Arc<dyn EventCodec>,
    ) -> Self {
        Self {
            remote,
            channel,
            registry,
            codec,
            closed: AtomicBool::new(false),
        }
    }
}

impl FastSender for UdpFastSender {
    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn send(&self, event: &Event) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        let bytes = self.codec.encode(event)?;
        let sent = self.channel.try_send_to(&bytes, self.remote)?;
        tracing::trace!(target: targets::SENDER, remote = %self.remote, %event, sent, "datagram sent");
        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry.unbind(self.remote);
        tracing::debug!(target: targets::SENDER, remote = %self.remote, "fast sender closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for UdpFastSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpFastSender")
            .field("remote", &self.remote)
            .field("channel", &self.channel)
            .field("closed", &self.is_closed())
            .finish()
    }
}
