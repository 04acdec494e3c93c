//! Per-datagram session attribution and the connect handshake.
//!
//! Datagram transports have no notion of "connected". A session created
//! over the reliable transport is bound to a client's datagram address by the
//! registry, and the first datagram seen from that address is turned into a
//! CONNECT event carrying a fast sender. Until the session reports its fast
//! transport enabled, further datagrams from the address are dropped.
//!
//! ```text
//! datagram ─▶ registry.lookup(source) ─▶ codec.decode ─▶ handshake.begin()
//!                  │ none                    │ error        │
//!                  ▼                         ▼              ├─ Started          ─▶ on_event(CONNECT + sender)
//!             Unattributed              DecodeFailed        ├─ InFlight         ─▶ DiscardedDuringHandshake
//!                                                           └─ AlreadyConnected ─▶ CONNECT? DuplicateConnect
//!                                                                                  else      on_event(event)
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use fastlane_core::logging::targets;
use fastlane_core::{
    DecodeContext, Event, EventCodec, HANDSHAKE_ATTRIBUTE, HandshakeBegin, Session,
    SessionRegistry,
};

use super::channel::DatagramChannel;
use super::datagram::{Datagram, DatagramBatch};
use super::sender::{FastSenderFactory, UdpSenderFactory};
use super::stats::{DispatchStats, DispatchStatsSnapshot};

/// What happened to one datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// No session is bound to the source address.
    Unattributed,
    /// The payload could not be decoded.
    DecodeFailed,
    /// A CONNECT with a fresh fast sender was delivered in its place.
    ConnectSynthesized,
    /// A handshake is in flight for the session; the event was dropped.
    DiscardedDuringHandshake,
    /// A CONNECT arrived after the handshake completed; dropped.
    DuplicateConnect,
    /// The decoded event was delivered to the session unchanged.
    Forwarded,
}

impl Dispatch {
    /// Whether the datagram reached the session in some form.
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::ConnectSynthesized | Self::Forwarded)
    }
}

/// Counts of outcomes for one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Datagrams in the batch.
    pub total: usize,
    /// Datagrams that reached a session (forwarded or synthesized CONNECT).
    pub delivered: usize,
    /// Datagrams that failed to decode.
    pub decode_failed: usize,
}

/// Attributes datagrams to sessions and drives the connect handshake.
///
/// One dispatcher may be shared by any number of receiving channels; all of
/// its state lives in the registry, the sessions and atomic counters.
pub struct UdpDispatcher {
    registry: Arc<dyn SessionRegistry>,
    codec: Arc<dyn EventCodec>,
    senders: Arc<dyn FastSenderFactory>,
    stats: DispatchStats,
}

impl UdpDispatcher {
    /// Create a dispatcher that builds [`UdpFastSender`](super::UdpFastSender)s
    /// encoding with the same codec it decodes with.
    pub fn new(registry: Arc<dyn SessionRegistry>, codec: Arc<dyn EventCodec>) -> Self {
        let senders = Arc::new(UdpSenderFactory::new(codec.clone()));
        Self {
            registry,
            codec,
            senders,
            stats: DispatchStats::new(),
        }
    }

    /// Replace the fast sender factory.
    pub fn with_sender_factory(mut self, factory: Arc<dyn FastSenderFactory>) -> Self {
        self.senders = factory;
        self
    }

    /// The session registry used for lookups.
    pub fn registry(&self) -> &Arc<dyn SessionRegistry> {
        &self.registry
    }

    /// Current dispatch counters.
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch every datagram of a receive pass, then release the batch.
    ///
    /// A failure on one datagram never stops the rest of the batch.
    pub fn dispatch_batch(
        &self,
        batch: DatagramBatch,
        channel: &Arc<dyn DatagramChannel>,
    ) -> BatchSummary {
        let mut summary = BatchSummary {
            total: batch.len(),
            ..Default::default()
        };
        for datagram in &batch {
            let outcome = self.dispatch(datagram, channel);
            if outcome.is_delivered() {
                summary.delivered += 1;
            }
            if outcome == Dispatch::DecodeFailed {
                summary.decode_failed += 1;
            }
        }
        batch.release();
        summary
    }

    /// Dispatch one datagram received on `channel`.
    pub fn dispatch(&self, datagram: &Datagram, channel: &Arc<dyn DatagramChannel>) -> Dispatch {
        let outcome = self.route(datagram, channel);
        self.stats.record(outcome);
        outcome
    }

    fn route(&self, datagram: &Datagram, channel: &Arc<dyn DatagramChannel>) -> Dispatch {
        let source = datagram.source;
        let Some(session) = self.registry.lookup(source) else {
            tracing::trace!(
                target: targets::DISPATCH,
                %source,
                "packet received from unknown source address, discarding"
            );
            return Dispatch::Unattributed;
        };

        let event = match self.codec.decode(&DecodeContext::new(source), &datagram.data) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    target: targets::DISPATCH,
                    %source,
                    session = %session.id(),
                    len = datagram.data.len(),
                    error = %err,
                    "failed to decode datagram, discarding"
                );
                return Dispatch::DecodeFailed;
            }
        };

        let begin = if session.is_fast_transport_enabled() {
            HandshakeBegin::AlreadyConnected
        } else {
            let handshake = session.handshake();
            match handshake.begin() {
                // Transport disabled but the cell still says connected.
                HandshakeBegin::AlreadyConnected if handshake.restart() => {
                    tracing::debug!(
                        target: targets::HANDSHAKE,
                        %source,
                        session = %session.id(),
                        "fast transport disabled on a connected session, restarting handshake"
                    );
                    HandshakeBegin::Started
                }
                HandshakeBegin::AlreadyConnected => HandshakeBegin::InFlight,
                begin => begin,
            }
        };

        match begin {
            HandshakeBegin::Started => {
                let connect = self.synthesize_connect(&event, source, channel);
                session.on_event(connect);
                Dispatch::ConnectSynthesized
            }
            HandshakeBegin::InFlight => {
                tracing::info!(
                    target: targets::DISPATCH,
                    %source,
                    session = %session.id(),
                    event_type = %event.event_type(),
                    marker = HANDSHAKE_ATTRIBUTE,
                    "discarding datagram, fast sender is not initialized yet"
                );
                Dispatch::DiscardedDuringHandshake
            }
            HandshakeBegin::AlreadyConnected => self.deliver(session.as_ref(), event, source),
        }
    }

    fn deliver(&self, session: &dyn Session, event: Event, source: SocketAddr) -> Dispatch {
        match event {
            Event::Connect(_) => {
                tracing::trace!(
                    target: targets::DISPATCH,
                    %source,
                    session = %session.id(),
                    "duplicate CONNECT on datagram channel, discarding"
                );
                Dispatch::DuplicateConnect
            }
            event @ (Event::Reconnect
            | Event::LogIn(_)
            | Event::LogOut
            | Event::SessionMessage(_)
            | Event::NetworkMessage(_)
            | Event::Disconnect) => {
                session.on_event(event);
                Dispatch::Forwarded
            }
        }
    }

    /// Build the CONNECT event that replaces `trigger` for a new address.
    ///
    /// The fast sender is bound to `remote`, replies through `channel` and
    /// unbinds from this dispatcher's registry when closed. Whatever the
    /// trigger carried is dropped.
    pub fn synthesize_connect(
        &self,
        trigger: &Event,
        remote: SocketAddr,
        channel: &Arc<dyn DatagramChannel>,
    ) -> Event {
        tracing::debug!(target: targets::HANDSHAKE, %remote, "incoming datagram connection");
        if !trigger.is_connect() {
            tracing::info!(
                target: targets::HANDSHAKE,
                %remote,
                event_type = %trigger.event_type(),
                "converting event to CONNECT, fast sender not initialized yet"
            );
        }
        let sender = self
            .senders
            .create(remote, channel.clone(), self.registry.clone());
        Event::connect(sender)
    }
}

impl std::fmt::Debug for UdpDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpDispatcher")
            .field("bound_addresses", &self.registry.len())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
