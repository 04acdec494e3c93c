//! UDP listener feeding received datagrams to a dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fastlane_core::logging::targets;
use parking_lot::Mutex;
use tokio::net::UdpSocket as TokioUdpSocket;
use tokio::sync::mpsc;

use super::channel::DatagramChannel;
use super::config::UdpListenerConfig;
use super::datagram::DatagramBatch;
use super::dispatcher::UdpDispatcher;
use super::state::UdpListenerState;
use crate::Result;
use crate::error::NetworkError;

/// Internal state for the listener.
struct UdpListenerInner {
    state: UdpListenerState,
    local_addr: Option<SocketAddr>,
}

/// Command sent to the listener's receive task.
enum Command {
    Close,
}

/// One receiving channel.
///
/// The listener binds a UDP socket, drains it in batches and hands each batch
/// to the shared [`UdpDispatcher`]. Fast senders created for clients of this
/// listener reply through the same socket.
///
/// # Example
///
/// ```ignore
/// let dispatcher = Arc::new(UdpDispatcher::new(registry, Arc::new(BinaryCodec::new())));
/// let listener = UdpListener::new(UdpListenerConfig::new("0.0.0.0", 18090), dispatcher);
///
/// let addr = listener.bind().await?;
/// println!("listening on {addr}");
///
/// // later
/// listener.close();
/// ```
pub struct UdpListener {
    config: UdpListenerConfig,
    dispatcher: Arc<UdpDispatcher>,
    inner: Arc<Mutex<UdpListenerInner>>,
    command_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Command>>>>,
    is_running: Arc<AtomicBool>,
}

impl UdpListener {
    /// Create a new listener with the given configuration.
    pub fn new(config: UdpListenerConfig, dispatcher: Arc<UdpDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            inner: Arc::new(Mutex::new(UdpListenerInner {
                state: UdpListenerState::Unbound,
                local_addr: None,
            })),
            command_tx: Arc::new(Mutex::new(None)),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the current listener state.
    pub fn state(&self) -> UdpListenerState {
        self.inner.lock().state
    }

    /// Check if the listener is bound.
    pub fn is_bound(&self) -> bool {
        self.inner.lock().state == UdpListenerState::Bound
    }

    /// Get the local address after binding.
    /// Returns `None` if the listener is not bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.lock().local_addr
    }

    /// The dispatcher this listener feeds.
    pub fn dispatcher(&self) -> &Arc<UdpDispatcher> {
        &self.dispatcher
    }

    /// Bind the socket and start the receive loop on the current tokio runtime.
    ///
    /// Returns the bound local address.
    pub async fn bind(&self) -> Result<SocketAddr> {
        if self.is_running.swap(true, Ordering::SeqCst) {
            return Err(NetworkError::AlreadyRunning);
        }

        self.inner.lock().state = UdpListenerState::Binding;

        let (socket, local_addr) = match self.open_socket().await {
            Ok(opened) => opened,
            Err(e) => {
                self.inner.lock().state = UdpListenerState::Unbound;
                self.is_running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        let socket = Arc::new(socket);

        let (tx, rx) = mpsc::unbounded_channel::<Command>();
        *self.command_tx.lock() = Some(tx);
        {
            let mut guard = self.inner.lock();
            guard.state = UdpListenerState::Bound;
            guard.local_addr = Some(local_addr);
        }
        tracing::info!(target: targets::LISTENER, %local_addr, "datagram listener bound");

        tokio::spawn(receive_loop(
            socket,
            self.dispatcher.clone(),
            self.config.clone(),
            rx,
            self.inner.clone(),
            self.command_tx.clone(),
            self.is_running.clone(),
        ));

        Ok(local_addr)
    }

    async fn open_socket(&self) -> Result<(TokioUdpSocket, SocketAddr)> {
        let addr = self.config.bind_addr();
        let socket = TokioUdpSocket::bind(addr.as_str())
            .await
            .map_err(|source| NetworkError::Bind { addr, source })?;

        if self.config.broadcast
            && let Err(e) = socket.set_broadcast(true)
        {
            tracing::warn!(target: targets::LISTENER, error = %e, "failed to enable broadcast");
        }
        let local_addr = socket.local_addr()?;
        Ok((socket, local_addr))
    }

    /// Close the listener. The receive loop finishes its current batch first.
    pub fn close(&self) {
        if let Some(tx) = self.command_tx.lock().as_ref() {
            let mut guard = self.inner.lock();
            if guard.state.is_active() {
                guard.state = UdpListenerState::Closing;
            }
            let _ = tx.send(Command::Close);
        }
    }

    /// Get the configured bind address.
    pub fn bind_addr(&self) -> String {
        self.config.bind_addr()
    }
}

async fn receive_loop(
    socket: Arc<TokioUdpSocket>,
    dispatcher: Arc<UdpDispatcher>,
    config: UdpListenerConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    inner: Arc<Mutex<UdpListenerInner>>,
    command_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Command>>>>,
    is_running: Arc<AtomicBool>,
) {
    let channel: Arc<dyn DatagramChannel> = socket.clone();
    // One spare byte tells an oversized datagram apart from an exact fit.
    let limit = config.recv_buffer_size;
    let mut buffer = vec![0u8; limit.saturating_add(1)];
    let max_batch = config.max_batch_size.max(1);

    loop {
        tokio::select! {
            cmd = commands.recv() => {
                match cmd {
                    Some(Command::Close) | None => break,
                }
            }

            ready = socket.readable() => {
                if let Err(e) = ready {
                    tracing::error!(
                        target: targets::LISTENER,
                        error = %e,
                        "socket readiness error, stopping receive loop"
                    );
                    break;
                }
                match DatagramBatch::drain(&socket, &mut buffer, limit, max_batch) {
                    Ok(batch) if batch.is_empty() => {}
                    Ok(batch) => {
                        let summary = dispatcher.dispatch_batch(batch, &channel);
                        tracing::trace!(
                            target: targets::LISTENER,
                            total = summary.total,
                            delivered = summary.delivered,
                            decode_failed = summary.decode_failed,
                            "batch dispatched"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(target: targets::LISTENER, error = %e, "receive error");
                    }
                }
            }
        }
    }

    *command_tx.lock() = None;
    {
        let mut guard = inner.lock();
        guard.state = UdpListenerState::Closed;
        guard.local_addr = None;
        is_running.store(false, Ordering::SeqCst);
    }
    tracing::info!(target: targets::LISTENER, "datagram listener closed");
}

impl Drop for UdpListener {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for UdpListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpListener")
            .field("bind_addr", &self.config.bind_addr())
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}
