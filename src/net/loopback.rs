//! In-memory link joining two nodes in one process
//!
//! Lossless and ordered. Messages still go through the wire codec so both ends
//! see exactly what a real peer would decode.

use std::sync::Arc;

use crate::game::inbox::InboxSender;
use crate::net::coordinator::inbound_command;
use crate::net::link::{Link, LinkError, LinkStatus};
use crate::net::protocol::{decode, encode, LinkMessage};

/// One end of a loopback pair
pub struct LoopbackLink {
    status: Arc<LinkStatus>,
    peer_status: Arc<LinkStatus>,
    peer_inbox: InboxSender,
}

impl LoopbackLink {
    /// Connect two inboxes. The first link delivers into `inbox_b`, the second into `inbox_a`.
    pub fn pair(inbox_a: InboxSender, inbox_b: InboxSender) -> (Self, Self) {
        let status_a = Arc::new(LinkStatus::default());
        let status_b = Arc::new(LinkStatus::default());
        status_a.set_connected(true);
        status_b.set_connected(true);

        let a = Self {
            status: status_a.clone(),
            peer_status: status_b.clone(),
            peer_inbox: inbox_b,
        };
        let b = Self {
            status: status_b,
            peer_status: status_a,
            peer_inbox: inbox_a,
        };
        (a, b)
    }

    /// Drop the connection on both ends
    pub fn disconnect(&self) {
        self.status.set_connected(false);
        self.peer_status.set_connected(false);
    }

    /// Override whether the peer asked for handoff delivery
    pub fn set_peer_subscribed(&self, subscribed: bool) {
        self.status.set_subscribed(subscribed);
    }
}

impl Link for LoopbackLink {
    fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    fn peer_subscribed(&self) -> bool {
        self.status.is_subscribed()
    }

    fn send(&self, message: &LinkMessage) -> Result<(), LinkError> {
        if !self.status.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let frame = encode(message)?;
        let delivered: LinkMessage = decode(&frame)?;

        match delivered {
            LinkMessage::Subscribe => self.peer_status.set_subscribed(true),
            other => {
                if let Some(command) = inbound_command(other) {
                    self.peer_inbox.try_send(command)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::inbox::{Inbox, NodeCommand};
    use crate::net::protocol::{HandoffMessage, PaddleUpdateMessage};

    #[test]
    fn test_delivers_to_peer_inbox() {
        let inbox_a = Inbox::new(8);
        let inbox_b = Inbox::new(8);
        let (a, b) = LoopbackLink::pair(inbox_a.sender(), inbox_b.sender());

        let handoff = HandoffMessage { x: 0, y: 7, vx: -2, vy: 1 };
        a.send(&LinkMessage::Handoff(handoff)).unwrap();
        b.send(&LinkMessage::PaddleUpdate(PaddleUpdateMessage { y: 33 })).unwrap();

        assert_eq!(inbox_b.drain(), vec![NodeCommand::HandoffIn(handoff)]);
        assert_eq!(inbox_a.drain(), vec![NodeCommand::PaddleUpdate(33)]);
    }

    #[test]
    fn test_subscribe_marks_peer() {
        let inbox_a = Inbox::new(8);
        let inbox_b = Inbox::new(8);
        let (host, guest) = LoopbackLink::pair(inbox_a.sender(), inbox_b.sender());

        assert!(!host.peer_subscribed());
        guest.send(&LinkMessage::Subscribe).unwrap();
        assert!(host.peer_subscribed());
        assert!(!guest.peer_subscribed());
        assert!(inbox_a.is_empty());
    }

    #[test]
    fn test_disconnect() {
        let inbox_a = Inbox::new(8);
        let inbox_b = Inbox::new(8);
        let (a, b) = LoopbackLink::pair(inbox_a.sender(), inbox_b.sender());
        b.send(&LinkMessage::Subscribe).unwrap();

        a.disconnect();

        assert!(!a.is_connected());
        assert!(!b.is_connected());
        assert!(!a.peer_subscribed());
        assert!(matches!(
            b.send(&LinkMessage::Subscribe),
            Err(LinkError::NotConnected)
        ));
    }
}
