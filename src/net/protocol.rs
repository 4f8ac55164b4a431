//! Wire messages exchanged between the two nodes
//!
//! Payload fields are fixed-width little-endian integers. bincode's legacy config
//! encodes structs exactly that way, so a `HandoffMessage` is 8 bytes on the wire.

use serde::{Deserialize, Serialize};

/// Ball state handed to the peer when the ball leaves through the right edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffMessage {
    /// Re-entry column on the receiving node
    pub x: u16,
    /// Vertical position, already mirrored by the sender
    pub y: u16,
    /// Horizontal speed, already negated by the sender
    pub vx: i16,
    /// Vertical speed, already negated by the sender
    pub vy: i16,
}

/// Latest paddle row of the sending node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddleUpdateMessage {
    pub y: u16,
}

/// Everything that travels over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMessage {
    /// Peer enabled delivery of handoff notifications
    Subscribe,
    /// Ball possession transfer
    Handoff(HandoffMessage),
    /// Paddle position relay (latest value wins)
    PaddleUpdate(PaddleUpdateMessage),
}

/// Encode a message using bincode
/// Uses legacy config for fixed-size little-endian integers
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a message using bincode
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);

/// Saturating conversion into the signed wire width
pub fn to_wire_speed(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Saturating conversion into the unsigned wire width
pub fn to_wire_coord(value: i32) -> u16 {
    value.clamp(0, u16::MAX as i32) as u16
}
