//! Datagram handshake example.
//!
//! Binds a listener, registers a session for a local "client" socket the way
//! a login over the reliable transport would, then drives the handshake and
//! a few messages over loopback.
//!
//! Run with: cargo run -p fastlane-net --example udp_session
//! Optional: pass a TOML listener config path as the first argument.
//! Set `RUST_LOG=fastlane=trace` to see every dispatch decision.

use std::sync::Arc;
use std::time::Duration;

use fastlane_core::{
    BinaryCodec, DefaultSession, Event, InMemorySessionRegistry, Payload, SessionRegistry,
};
use fastlane_net::udp::{UdpDispatcher, UdpListener, UdpListenerConfig};
use tokio::net::UdpSocket;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fastlane=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => UdpListenerConfig::load(path)?,
        None => UdpListenerConfig::new("127.0.0.1", 0),
    };

    let registry = Arc::new(InMemorySessionRegistry::new());
    let dispatcher = Arc::new(UdpDispatcher::new(
        registry.clone(),
        Arc::new(BinaryCodec::new()),
    ));
    let listener = UdpListener::new(config, dispatcher.clone());
    let server_addr = listener.bind().await?;
    println!("Listening on {server_addr}");

    let client = UdpSocket::bind("127.0.0.1:0").await?;
    let (session, mut events) = DefaultSession::new();
    registry.bind(client.local_addr()?, session.clone());

    // Two datagrams back to back: the first becomes the CONNECT, the second
    // may be dropped while the handshake is in flight.
    client.send_to(b"\x1cMOVE 10 20", server_addr).await?;
    client.send_to(b"\x1cMOVE 11 20", server_addr).await?;

    if let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(1), events.recv()).await {
        println!("Session received: {event}");
    }

    client.send_to(b"\x1cCHAT hello", server_addr).await?;
    client.send_to(&[0x02], server_addr).await?;
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_millis(200), events.recv()).await
    {
        println!("Session received: {event}");
    }

    session.send_fast(&Event::NetworkMessage(Payload::from("welcome")))?;
    let mut buf = [0u8; 1500];
    let (n, from) = client.recv_from(&mut buf).await?;
    println!("Client received {n} bytes from {from}");

    println!("Dispatch stats: {:?}", dispatcher.stats());
    listener.close();
    Ok(())
}
