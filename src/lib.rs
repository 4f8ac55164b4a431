//! Relay Pong
//!
//! Two-node pong where the ball is handed off over a point-to-point link. Each
//! node renders its own half of the court and bounces the ball off its paddle;
//! when the ball leaves through the far edge it is mirrored and passed to the
//! peer.

pub mod config;
pub mod util;
pub mod game;
pub mod net;
pub mod metrics;
