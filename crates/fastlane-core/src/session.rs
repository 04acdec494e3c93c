//! Sessions: long-lived endpoints that outlive any one transport.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::SendError;
use crate::event::Event;
use crate::handshake::HandshakeCell;
use crate::logging::targets;
use crate::sender::FastSender;

/// Unique identifier for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate a new process-unique session ID.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A logical session as seen by the datagram dispatcher.
///
/// The dispatcher reads and advances the handshake state and hands events
/// to [`on_event`](Self::on_event). It never creates or destroys sessions.
pub trait Session: Send + Sync {
    /// The session's identity.
    fn id(&self) -> SessionId;

    /// Handshake state of the fast transport.
    fn handshake(&self) -> &HandshakeCell;

    /// Whether a fast sender is currently bound.
    fn is_fast_transport_enabled(&self) -> bool {
        self.handshake().is_connected()
    }

    /// Event intake. Fire-and-forget from the caller's point of view.
    fn on_event(&self, event: Event);
}

/// A session that binds fast senders from CONNECT events and queues every
/// event for the application on an unbounded channel.
pub struct DefaultSession {
    id: SessionId,
    handshake: HandshakeCell,
    fast_sender: Mutex<Option<Arc<dyn FastSender>>>,
    events: mpsc::UnboundedSender<Event>,
}

impl DefaultSession {
    /// Create a session and the receiver its events are delivered to.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            id: SessionId::next(),
            handshake: HandshakeCell::new(),
            fast_sender: Mutex::new(None),
            events,
        });
        (session, rx)
    }

    /// The currently bound fast sender.
    pub fn fast_sender(&self) -> Option<Arc<dyn FastSender>> {
        self.fast_sender.lock().clone()
    }

    /// Send an event over the fast transport.
    pub fn send_fast(&self, event: &Event) -> Result<(), SendError> {
        let sender = self.fast_sender().ok_or(SendError::NotConnected)?;
        sender.send(event)
    }

    fn bind_sender(&self, sender: Arc<dyn FastSender>) {
        let remote = sender.remote_addr();
        let previous = self.fast_sender.lock().replace(sender);
        // Closing a sender may unbind its address, which the new sender still needs.
        if let Some(previous) = previous
            && previous.remote_addr() != remote
        {
            previous.close();
        }
        self.handshake.complete();
        tracing::debug!(target: targets::SESSION, session = %self.id, "fast transport enabled");
    }

    fn unbind_sender(&self) {
        let previous = self.fast_sender.lock().take();
        if let Some(previous) = previous {
            previous.close();
        }
        self.handshake.reset();
    }
}

impl Session for DefaultSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn handshake(&self) -> &HandshakeCell {
        &self.handshake
    }

    fn on_event(&self, event: Event) {
        match &event {
            Event::Connect(connect) => {
                if let Some(sender) = connect.sender() {
                    self.bind_sender(sender.clone());
                }
            }
            Event::Disconnect => self.unbind_sender(),
            Event::Reconnect
            | Event::LogIn(_)
            | Event::LogOut
            | Event::SessionMessage(_)
            | Event::NetworkMessage(_) => {}
        }

        if self.events.send(event).is_err() {
            tracing::trace!(target: targets::SESSION, session = %self.id, "event receiver dropped");
        }
    }
}

impl fmt::Debug for DefaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultSession")
            .field("id", &self.id)
            .field("handshake", &self.handshake.state())
            .field("fast_sender", &self.fast_sender.lock().as_ref().map(|s| s.remote_addr()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::event::Payload;
    use crate::handshake::HandshakeState;

    #[derive(Debug)]
    struct StubSender {
        addr: SocketAddr,
        closed: AtomicBool,
        sent: Mutex<Vec<Event>>,
    }

    impl StubSender {
        fn new(addr: &str) -> Arc<Self> {
            Arc::new(Self {
                addr: addr.parse().unwrap(),
                closed: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl FastSender for StubSender {
        fn remote_addr(&self) -> SocketAddr {
            self.addr
        }

        fn send(&self, event: &Event) -> Result<(), SendError> {
            self.sent.lock().push(event.clone());
            Ok(())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert_ne!(a, b);
        assert_eq!(format!("{a}"), format!("session-{}", a.as_u64()));
    }

    #[test]
    fn connect_binds_sender_and_enables_fast_transport() {
        let (session, mut rx) = DefaultSession::new();
        assert!(!session.is_fast_transport_enabled());
        assert!(matches!(
            session.send_fast(&Event::LogOut),
            Err(SendError::NotConnected)
        ));

        let sender = StubSender::new("10.0.0.1:7000");
        assert_eq!(session.handshake().begin(), crate::HandshakeBegin::Started);
        session.on_event(Event::connect(sender.clone()));

        assert!(session.is_fast_transport_enabled());
        assert_eq!(session.handshake().state(), HandshakeState::Connected);
        assert!(rx.try_recv().unwrap().is_connect());

        let message = Event::NetworkMessage(Payload::from("pos"));
        session.send_fast(&message).unwrap();
        assert_eq!(sender.sent.lock().as_slice(), &[message]);
    }

    #[test]
    fn disconnect_closes_sender_and_resets() {
        let (session, mut rx) = DefaultSession::new();
        let sender = StubSender::new("10.0.0.1:7000");
        session.on_event(Event::connect(sender.clone()));
        session.on_event(Event::Disconnect);

        assert!(sender.is_closed());
        assert!(session.fast_sender().is_none());
        assert_eq!(session.handshake().state(), HandshakeState::Disconnected);

        assert!(rx.try_recv().unwrap().is_connect());
        assert_eq!(rx.try_recv().unwrap(), Event::Disconnect);
    }

    #[test]
    fn rebinding_closes_previous_sender() {
        let (session, _rx) = DefaultSession::new();
        let first = StubSender::new("10.0.0.1:7000");
        let second = StubSender::new("10.0.0.1:7001");
        session.on_event(Event::connect(first.clone()));
        session.on_event(Event::connect(second.clone()));

        assert!(first.is_closed());
        assert!(!second.is_closed());
        assert_eq!(
            session.fast_sender().map(|s| s.remote_addr()),
            Some(second.addr)
        );
    }

    #[test]
    fn events_survive_dropped_receiver() {
        let (session, rx) = DefaultSession::new();
        drop(rx);
        session.on_event(Event::SessionMessage(Payload::from("late")));
    }
}
