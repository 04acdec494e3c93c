//! State enumerations for UDP listeners.

/// State of a UDP listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UdpListenerState {
    /// Listener is not bound.
    #[default]
    Unbound,
    /// Listener is binding to an address.
    Binding,
    /// Listener is bound and dispatching datagrams.
    Bound,
    /// Listener is shutting down its receive loop.
    Closing,
    /// Listener is closed.
    Closed,
}

impl UdpListenerState {
    /// Whether a receive loop exists or is being set up.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Binding | Self::Bound | Self::Closing)
    }

    /// Whether the listener may be bound again.
    pub fn can_bind(self) -> bool {
        matches!(self, Self::Unbound | Self::Closed)
    }
}

impl std::fmt::Display for UdpListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unbound => "Unbound",
            Self::Binding => "Binding",
            Self::Bound => "Bound",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
        };
        f.write_str(name)
    }
}
