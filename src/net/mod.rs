pub mod protocol;
pub mod framing;
pub mod link;
pub mod loopback;
pub mod tcp;
pub mod coordinator;
pub mod game_session;
