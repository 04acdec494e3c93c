//! Address to session lookup.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::session::Session;

/// Maps transport addresses to sessions.
///
/// Bindings are created by whatever out-of-band mechanism pairs a client
/// address with an existing session (usually the reliable transport's login
/// flow). Implementations must tolerate concurrent lookups from several
/// receiving contexts.
pub trait SessionRegistry: Send + Sync {
    /// Find the session bound to `addr`.
    fn lookup(&self, addr: SocketAddr) -> Option<Arc<dyn Session>>;

    /// Bind `addr` to `session`, returning the session it replaced.
    fn bind(&self, addr: SocketAddr, session: Arc<dyn Session>) -> Option<Arc<dyn Session>>;

    /// Remove the binding for `addr`.
    fn unbind(&self, addr: SocketAddr) -> Option<Arc<dyn Session>>;

    /// Number of bound addresses.
    fn len(&self) -> usize;

    /// Whether no address is bound.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`SessionRegistry`] backed by a read-write locked hash map.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: RwLock<HashMap<SocketAddr, Arc<dyn Session>>>,
}

impl InMemorySessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Addresses currently bound.
    pub fn addresses(&self) -> Vec<SocketAddr> {
        self.sessions.read().keys().copied().collect()
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn lookup(&self, addr: SocketAddr) -> Option<Arc<dyn Session>> {
        self.sessions.read().get(&addr).cloned()
    }

    fn bind(&self, addr: SocketAddr, session: Arc<dyn Session>) -> Option<Arc<dyn Session>> {
        let id = session.id();
        let previous = self.sessions.write().insert(addr, session);
        tracing::debug!(
            target: targets::REGISTRY,
            %addr,
            session = %id,
            replaced = previous.is_some(),
            "address bound"
        );
        previous
    }

    fn unbind(&self, addr: SocketAddr) -> Option<Arc<dyn Session>> {
        let previous = self.sessions.write().remove(&addr);
        if previous.is_some() {
            tracing::debug!(target: targets::REGISTRY, %addr, "address unbound");
        }
        previous
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

impl fmt::Debug for InMemorySessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySessionRegistry")
            .field("bound", &self.len())
            .finish()
    }
}
