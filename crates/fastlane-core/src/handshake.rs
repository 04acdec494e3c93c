//! Per-session handshake state for the fast transport.
//!
//! Replaces a boolean "connecting" attribute probed by key. The cell holds
//! one of three states and every transition that matters for duplicate
//! suppression is a single compare-and-swap, so two receiving contexts can
//! never both start a handshake for the same session.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Reserved name of the handshake marker, used as a log field.
pub const HANDSHAKE_ATTRIBUTE: &str = "UDP_CONNECTING";

/// State of a session's fast transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum HandshakeState {
    /// No fast sender, no handshake underway.
    #[default]
    Disconnected = 0,
    /// A CONNECT has been synthesized and is being processed by the session.
    Handshaking = 1,
    /// The session has bound its fast sender.
    Connected = 2,
}

impl HandshakeState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Handshaking,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Handshaking => write!(f, "Handshaking"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Result of [`HandshakeCell::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeBegin {
    /// This caller won the transition to `Handshaking` and owns the handshake.
    Started,
    /// Another caller already started a handshake that has not completed.
    InFlight,
    /// The fast transport is already connected.
    AlreadyConnected,
}

/// Atomic holder of a [`HandshakeState`].
#[derive(Debug, Default)]
pub struct HandshakeCell {
    state: AtomicU8,
}

impl HandshakeCell {
    /// Create a cell in the `Disconnected` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        HandshakeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the fast transport is connected.
    pub fn is_connected(&self) -> bool {
        self.state() == HandshakeState::Connected
    }

    /// Try to move `Disconnected -> Handshaking`.
    ///
    /// Exactly one concurrent caller observes [`HandshakeBegin::Started`].
    pub fn begin(&self) -> HandshakeBegin {
        match self.state.compare_exchange(
            HandshakeState::Disconnected as u8,
            HandshakeState::Handshaking as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => HandshakeBegin::Started,
            Err(current) => match HandshakeState::from_u8(current) {
                HandshakeState::Connected => HandshakeBegin::AlreadyConnected,
                // Disconnected cannot be observed on failure of this CAS.
                HandshakeState::Handshaking | HandshakeState::Disconnected => {
                    HandshakeBegin::InFlight
                }
            },
        }
    }

    /// Try to move a stale `Connected -> Handshaking`.
    ///
    /// Used when the session reports its fast transport disabled while the
    /// cell still says connected. Returns `true` for the one caller that wins.
    pub fn restart(&self) -> bool {
        self.state
            .compare_exchange(
                HandshakeState::Connected as u8,
                HandshakeState::Handshaking as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Mark the fast transport connected.
    pub fn complete(&self) {
        self.state
            .store(HandshakeState::Connected as u8, Ordering::Release);
    }

    /// Return to `Disconnected`, allowing a new handshake.
    pub fn reset(&self) {
        self.state
            .store(HandshakeState::Disconnected as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    #[test]
    fn lifecycle() {
        let cell = HandshakeCell::new();
        assert_eq!(cell.state(), HandshakeState::Disconnected);

        assert_eq!(cell.begin(), HandshakeBegin::Started);
        assert_eq!(cell.state(), HandshakeState::Handshaking);
        assert_eq!(cell.begin(), HandshakeBegin::InFlight);

        cell.complete();
        assert!(cell.is_connected());
        assert_eq!(cell.begin(), HandshakeBegin::AlreadyConnected);

        cell.reset();
        assert_eq!(cell.begin(), HandshakeBegin::Started);
    }

    #[test]
    fn restart_only_from_connected() {
        let cell = HandshakeCell::new();
        assert!(!cell.restart());
        assert_eq!(cell.state(), HandshakeState::Disconnected);

        cell.complete();
        assert!(cell.restart());
        assert_eq!(cell.state(), HandshakeState::Handshaking);
        assert!(!cell.restart());
        assert_eq!(cell.begin(), HandshakeBegin::InFlight);
    }

    #[test]
    fn state_display() {
        assert_eq!(HandshakeState::Disconnected.to_string(), "Disconnected");
        assert_eq!(HandshakeState::Handshaking.to_string(), "Handshaking");
        assert_eq!(HandshakeState::Connected.to_string(), "Connected");
    }

    #[test]
    fn only_one_concurrent_begin_wins() {
        const THREADS: usize = 16;

        for _ in 0..50 {
            let cell = Arc::new(HandshakeCell::new());
            let barrier = Arc::new(Barrier::new(THREADS));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let cell = cell.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        cell.begin()
                    })
                })
                .collect();

            let outcomes: Vec<_> = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect();

            let started = outcomes
                .iter()
                .filter(|o| **o == HandshakeBegin::Started)
                .count();
            assert_eq!(started, 1);
            assert!(outcomes
                .iter()
                .all(|o| matches!(o, HandshakeBegin::Started | HandshakeBegin::InFlight)));
        }
    }
}
