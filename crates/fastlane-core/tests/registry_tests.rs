//! Concurrency tests for the session registry and handshake state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use fastlane_core::{
    DefaultSession, HandshakeBegin, HandshakeState, InMemorySessionRegistry, Session,
    SessionRegistry,
};

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, 1], port))
}

#[test]
fn test_concurrent_lookups_during_rebinding() {
    let registry = Arc::new(InMemorySessionRegistry::new());
    let (first, _rx1) = DefaultSession::new();
    let (second, _rx2) = DefaultSession::new();
    registry.bind(addr(7000), first.clone());

    let hits = AtomicUsize::new(0);
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..1000 {
                    let found = registry.lookup(addr(7000)).expect("address stays bound");
                    assert!(found.id() == first.id() || found.id() == second.id());
                    hits.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
        scope.spawn(|| {
            for i in 0..500 {
                let next: Arc<dyn Session> = if i % 2 == 0 {
                    second.clone()
                } else {
                    first.clone()
                };
                registry.bind(addr(7000), next);
            }
        });
    });

    assert_eq!(hits.load(Ordering::Relaxed), 4000);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_looked_up_sessions_share_handshake_state() {
    let registry = InMemorySessionRegistry::new();
    let (session, _rx) = DefaultSession::new();
    registry.bind(addr(7001), session.clone());

    let a = registry.lookup(addr(7001)).unwrap();
    let b = registry.lookup(addr(7001)).unwrap();

    assert_eq!(a.handshake().begin(), HandshakeBegin::Started);
    assert_eq!(b.handshake().begin(), HandshakeBegin::InFlight);
    assert_eq!(session.handshake().state(), HandshakeState::Handshaking);
}
