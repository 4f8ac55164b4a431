//! Lock-free command inbox for the game task
//!
//! Uses crossbeam-channel for lock-free MPSC communication from the link reader
//! and the local input source to the game loop. The game task is the only consumer,
//! so every state mutation is serialized without explicit critical sections.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::game::constants::net::INBOX_CAPACITY;
use crate::net::protocol::HandoffMessage;

/// A state change requested from outside the game task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCommand {
    /// Peer relinquished the ball to us
    HandoffIn(HandoffMessage),
    /// Peer pushed a paddle row
    PaddleUpdate(u16),
    /// Local input set an absolute paddle row
    MovePaddle(i32),
    /// Local input nudged the paddle by a signed offset
    NudgePaddle(i32),
}

/// Bounded inbox drained by the game loop at every tick
pub struct Inbox {
    sender: Sender<NodeCommand>,
    receiver: Receiver<NodeCommand>,
    capacity: usize,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Create a new sender handle for a producer
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            sender: self.sender.clone(),
        }
    }

    /// Drain all pending commands in arrival order
    pub fn drain(&self) -> Vec<NodeCommand> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new(INBOX_CAPACITY)
    }
}

/// Clonable sender handle for producers
#[derive(Clone)]
pub struct InboxSender {
    sender: Sender<NodeCommand>,
}

impl InboxSender {
    /// Submit a command (non-blocking)
    #[inline]
    pub fn try_send(&self, command: NodeCommand) -> Result<(), InboxError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => InboxError::Full,
            TrySendError::Disconnected(_) => InboxError::Disconnected,
        })
    }
}

/// Inbox errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InboxError {
    /// Inbox is full (game task is not keeping up)
    #[error("inbox full")]
    Full,
    /// Game task is gone
    #[error("inbox disconnected")]
    Disconnected,
}
