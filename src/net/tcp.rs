//! TCP link between the two nodes
//!
//! The Host listens and serves one peer at a time; the Guest connects and then
//! subscribes to handoff delivery. Each connection gets a reader task feeding the
//! inbox and a writer task draining an unbounded queue, so `send` never blocks
//! the game task.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::constants::net::CONNECT_RETRY_MS;
use crate::game::inbox::InboxSender;
use crate::net::coordinator::inbound_command;
use crate::net::framing::{read_message, write_message, FramingError};
use crate::net::link::{Link, LinkError, LinkStatus};
use crate::net::protocol::{decode, encode, LinkMessage};

/// Outbound queue of the attached connection
struct Attached {
    connection_id: u64,
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

#[derive(Default)]
struct TcpShared {
    status: LinkStatus,
    writer: Mutex<Option<Attached>>,
    next_connection_id: AtomicU64,
}

impl TcpShared {
    fn detach(&self) {
        self.writer.lock().take();
        self.status.set_connected(false);
    }

    /// Detach only if `connection_id` is still the attached connection
    fn detach_connection(&self, connection_id: u64) {
        let mut writer = self.writer.lock();
        if writer.as_ref().map(|a| a.connection_id) == Some(connection_id) {
            *writer = None;
            self.status.set_connected(false);
        }
    }
}

/// Link over a single TCP stream
pub struct TcpLink {
    shared: Arc<TcpShared>,
    local_addr: SocketAddr,
}

impl TcpLink {
    /// Bind and accept peers in the background
    pub async fn listen(addr: SocketAddr, inbox: InboxSender) -> Result<Self, LinkError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let shared = Arc::new(TcpShared::default());

        info!("Waiting for peer on {}", local_addr);

        let accept_shared = shared.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        if accept_shared.status.is_connected() {
                            warn!("Rejecting {}: a peer is already attached", peer);
                            continue;
                        }
                        info!("Peer connected from {}", peer);
                        attach(stream, accept_shared.clone(), inbox.clone());
                    }
                    Err(e) => warn!("Accept failed: {}", e),
                }
            }
        });

        Ok(Self { shared, local_addr })
    }

    /// Connect to the Host, retrying until it answers, then subscribe to handoffs
    pub async fn connect(addr: SocketAddr, inbox: InboxSender) -> Result<Self, LinkError> {
        let stream = loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => break stream,
                Err(e) => {
                    debug!("Peer {} not reachable ({}), retrying", addr, e);
                    tokio::time::sleep(Duration::from_millis(CONNECT_RETRY_MS)).await;
                }
            }
        };
        let local_addr = stream.local_addr()?;
        info!("Connected to peer {}", addr);

        let shared = Arc::new(TcpShared::default());
        attach(stream, shared.clone(), inbox);

        let link = Self { shared, local_addr };
        link.send(&LinkMessage::Subscribe)?;
        Ok(link)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Drop the current peer. Its writer half shuts down once queued frames are out.
    pub fn close(&self) {
        self.shared.detach();
    }
}

impl Drop for TcpLink {
    fn drop(&mut self) {
        self.shared.detach();
    }
}

impl Link for TcpLink {
    fn is_connected(&self) -> bool {
        self.shared.status.is_connected()
    }

    fn peer_subscribed(&self) -> bool {
        self.shared.status.is_subscribed()
    }

    fn send(&self, message: &LinkMessage) -> Result<(), LinkError> {
        let frame = encode(message)?;
        let writer = self.shared.writer.lock();
        let attached = writer.as_ref().ok_or(LinkError::NotConnected)?;
        attached.tx.send(frame).map_err(|_| LinkError::Closed)
    }
}

/// Spawn reader and writer tasks for a fresh connection
fn attach(stream: TcpStream, shared: Arc<TcpShared>, inbox: InboxSender) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", e);
    }
    let (mut reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let connection_id = shared.next_connection_id.fetch_add(1, Ordering::Relaxed);
    *shared.writer.lock() = Some(Attached { connection_id, tx });
    shared.status.set_connected(true);

    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = write_message(&mut writer, &frame).await {
                warn!("Link write failed: {}", e);
                break;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            match read_message(&mut reader).await {
                Ok(frame) => match decode::<LinkMessage>(&frame) {
                    Ok(LinkMessage::Subscribe) => {
                        info!("Peer enabled handoff delivery");
                        shared.status.set_subscribed(true);
                    }
                    Ok(message) => {
                        if let Some(command) = inbound_command(message) {
                            if let Err(e) = inbox.try_send(command) {
                                warn!("Dropping inbound {:?}: {}", command, e);
                            }
                        }
                    }
                    Err(e) => warn!("Dropping malformed frame: {}", e),
                },
                Err(FramingError::ConnectionClosed) => {
                    info!("Peer disconnected");
                    break;
                }
                Err(e) => {
                    warn!("Link read failed: {}", e);
                    break;
                }
            }
        }
        shared.detach_connection(connection_id);
    });
}
