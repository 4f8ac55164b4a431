//! Point-to-point link abstraction
//!
//! The game only needs to know whether a peer is there, whether it asked for
//! handoff delivery, and how to submit a message without blocking the tick.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::game::inbox::InboxError;
use crate::net::framing::FramingError;
use crate::net::protocol::{DecodeError, EncodeError, LinkMessage};

/// Errors surfaced by a link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("no active peer connection")]
    NotConnected,
    #[error("peer has not enabled handoff delivery")]
    NotSubscribed,
    #[error("link closed")]
    Closed,
    #[error("peer inbox rejected message: {0}")]
    Inbox(#[from] InboxError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport collaborator carrying handoff and paddle messages to the peer
pub trait Link: Send + Sync {
    /// Whether a peer is currently attached
    fn is_connected(&self) -> bool;

    /// Whether the peer has enabled delivery of handoffs
    fn peer_subscribed(&self) -> bool;

    /// Submit a message without waiting for delivery
    fn send(&self, message: &LinkMessage) -> Result<(), LinkError>;
}

/// Connection flags shared between a link handle and its background tasks
#[derive(Debug, Default)]
pub struct LinkStatus {
    connected: AtomicBool,
    subscribed: AtomicBool,
}

impl LinkStatus {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
        if !connected {
            self.subscribed.store(false, Ordering::Release);
        }
    }

    pub fn set_subscribed(&self, subscribed: bool) {
        self.subscribed.store(subscribed, Ordering::Release);
    }
}
