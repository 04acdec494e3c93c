//! Dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::dispatcher::Dispatch;

/// Atomic per-outcome dispatch counters.
#[derive(Debug, Default)]
pub struct DispatchStats {
    received: AtomicU64,
    unattributed: AtomicU64,
    decode_failed: AtomicU64,
    connects_synthesized: AtomicU64,
    discarded_during_handshake: AtomicU64,
    duplicate_connects: AtomicU64,
    forwarded: AtomicU64,
}

impl DispatchStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dispatched datagram.
    pub fn record(&self, outcome: Dispatch) {
        self.received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Dispatch::Unattributed => &self.unattributed,
            Dispatch::DecodeFailed => &self.decode_failed,
            Dispatch::ConnectSynthesized => &self.connects_synthesized,
            Dispatch::DiscardedDuringHandshake => &self.discarded_during_handshake,
            Dispatch::DuplicateConnect => &self.duplicate_connects,
            Dispatch::Forwarded => &self.forwarded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters.
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            unattributed: self.unattributed.load(Ordering::Relaxed),
            decode_failed: self.decode_failed.load(Ordering::Relaxed),
            connects_synthesized: self.connects_synthesized.load(Ordering::Relaxed),
            discarded_during_handshake: self.discarded_during_handshake.load(Ordering::Relaxed),
            duplicate_connects: self.duplicate_connects.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
        }
    }
}

/// Copy of [`DispatchStats`] at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStatsSnapshot {
    /// Datagrams seen.
    pub received: u64,
    /// Datagrams from addresses without a session.
    pub unattributed: u64,
    /// Datagrams that failed to decode.
    pub decode_failed: u64,
    /// CONNECT events synthesized.
    pub connects_synthesized: u64,
    /// Datagrams dropped while a handshake was in flight.
    pub discarded_during_handshake: u64,
    /// CONNECTs dropped after the handshake completed.
    pub duplicate_connects: u64,
    /// Events passed through to a session.
    pub forwarded: u64,
}

impl DispatchStatsSnapshot {
    /// Datagrams that did not reach a session in any form.
    pub fn dropped(&self) -> u64 {
        self.unattributed
            + self.decode_failed
            + self.discarded_during_handshake
            + self.duplicate_connects
    }
}
