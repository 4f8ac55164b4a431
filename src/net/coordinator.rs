//! Handoff coordinator
//!
//! Outbound: submits the mirrored ball state when the ball leaves through the right
//! edge. The Host hands off by notification and treats a missing or unsubscribed
//! peer as fatal; the Guest writes best-effort. Also relays local paddle moves.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::game::inbox::NodeCommand;
use crate::game::state::NodeRole;
use crate::net::link::{Link, LinkError};
use crate::net::protocol::{to_wire_coord, HandoffMessage, LinkMessage, PaddleUpdateMessage};

/// Fatal handoff failures
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("peer unavailable for handoff: {0}")]
    PeerUnavailable(#[source] LinkError),
}

/// Map inbound link traffic to game commands. `Subscribe` is link-level and yields nothing.
pub fn inbound_command(message: LinkMessage) -> Option<NodeCommand> {
    match message {
        LinkMessage::Subscribe => None,
        LinkMessage::Handoff(handoff) => Some(NodeCommand::HandoffIn(handoff)),
        LinkMessage::PaddleUpdate(update) => Some(NodeCommand::PaddleUpdate(update.y)),
    }
}

pub struct HandoffCoordinator {
    role: NodeRole,
    link: Arc<dyn Link>,
    last_relayed_paddle: Option<u16>,
}

impl HandoffCoordinator {
    pub fn new(role: NodeRole, link: Arc<dyn Link>) -> Self {
        Self {
            role,
            link,
            last_relayed_paddle: None,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Submit an outbound handoff. Only returns an error when the node must halt.
    pub fn send_handoff(&self, message: &HandoffMessage) -> Result<(), HandoffError> {
        let envelope = LinkMessage::Handoff(*message);

        if self.role.is_authoritative_sender() {
            if !self.link.is_connected() {
                return Err(HandoffError::PeerUnavailable(LinkError::NotConnected));
            }
            if !self.link.peer_subscribed() {
                return Err(HandoffError::PeerUnavailable(LinkError::NotSubscribed));
            }
            self.link
                .send(&envelope)
                .map_err(HandoffError::PeerUnavailable)?;
        } else if let Err(e) = self.link.send(&envelope) {
            warn!("Handoff write to peer failed: {}", e);
            return Ok(());
        }

        info!(
            x = message.x,
            y = message.y,
            vx = message.vx,
            vy = message.vy,
            "Ball handed to peer"
        );
        Ok(())
    }

    /// Fire-and-forget paddle relay. Returns whether a message was submitted.
    pub fn relay_paddle(&mut self, y: i32) -> bool {
        let y = to_wire_coord(y);
        if self.last_relayed_paddle == Some(y) {
            return false;
        }

        match self.link.send(&LinkMessage::PaddleUpdate(PaddleUpdateMessage { y })) {
            Ok(()) => {
                self.last_relayed_paddle = Some(y);
                true
            }
            Err(e) => {
                debug!("Paddle relay dropped: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::inbox::Inbox;
    use crate::net::loopback::LoopbackLink;

    const MSG: HandoffMessage = HandoffMessage {
        x: 0,
        y: 119,
        vx: -1,
        vy: 0,
    };

    fn linked(role: NodeRole) -> (HandoffCoordinator, Arc<LoopbackLink>, Inbox) {
        let local = Inbox::new(16);
        let peer = Inbox::new(16);
        let (link, _peer_link) = LoopbackLink::pair(local.sender(), peer.sender());
        let link = Arc::new(link);
        (HandoffCoordinator::new(role, link.clone()), link, peer)
    }

    #[test]
    fn test_inbound_mapping() {
        assert_eq!(inbound_command(LinkMessage::Subscribe), None);
        assert_eq!(
            inbound_command(LinkMessage::Handoff(MSG)),
            Some(NodeCommand::HandoffIn(MSG))
        );
        assert_eq!(
            inbound_command(LinkMessage::PaddleUpdate(PaddleUpdateMessage { y: 9 })),
            Some(NodeCommand::PaddleUpdate(9))
        );
    }

    #[test]
    fn test_host_requires_subscription() {
        let (coordinator, link, peer) = linked(NodeRole::Host);

        let err = coordinator.send_handoff(&MSG).unwrap_err();
        assert!(matches!(
            err,
            HandoffError::PeerUnavailable(LinkError::NotSubscribed)
        ));
        assert!(peer.is_empty());

        link.set_peer_subscribed(true);
        coordinator.send_handoff(&MSG).unwrap();
        assert_eq!(peer.drain(), vec![NodeCommand::HandoffIn(MSG)]);
    }

    #[test]
    fn test_host_without_peer_is_fatal() {
        let (coordinator, link, _peer) = linked(NodeRole::Host);
        link.set_peer_subscribed(true);
        link.disconnect();

        assert!(matches!(
            coordinator.send_handoff(&MSG),
            Err(HandoffError::PeerUnavailable(LinkError::NotConnected))
        ));
    }

    #[test]
    fn test_guest_write_is_best_effort() {
        let (coordinator, link, peer) = linked(NodeRole::Guest);

        // No subscription needed for a write
        coordinator.send_handoff(&MSG).unwrap();
        assert_eq!(peer.drain(), vec![NodeCommand::HandoffIn(MSG)]);

        link.disconnect();
        assert!(coordinator.send_handoff(&MSG).is_ok());
        assert!(peer.is_empty());
    }

    #[test]
    fn test_paddle_relay_skips_repeats() {
        let (mut coordinator, _link, peer) = linked(NodeRole::Guest);

        assert!(coordinator.relay_paddle(120));
        assert!(!coordinator.relay_paddle(120));
        assert!(coordinator.relay_paddle(125));

        assert_eq!(
            peer.drain(),
            vec![NodeCommand::PaddleUpdate(120), NodeCommand::PaddleUpdate(125)]
        );
    }

    #[test]
    fn test_paddle_relay_failure_is_silent() {
        let (mut coordinator, link, peer) = linked(NodeRole::Host);
        link.disconnect();

        assert!(!coordinator.relay_paddle(80));
        assert!(peer.is_empty());
    }
}
