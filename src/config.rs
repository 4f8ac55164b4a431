use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::game::constants::timing;
use crate::game::game_loop::GameLoopConfig;
use crate::game::state::NodeRole;

/// Node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Host starts with the ball and listens, Guest connects
    pub role: NodeRole,
    /// Address the Host listens on
    pub bind_address: IpAddr,
    /// Port the Host listens on
    pub port: u16,
    /// Host address the Guest connects to
    pub peer_address: SocketAddr,
    /// Loop cadence in milliseconds
    pub tick_ms: u64,
    /// Pause after a miss in milliseconds
    pub settle_ms: u64,
    /// Fixed seed for reproducible bounces
    pub rng_seed: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::Host,
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 4433,
            peer_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4433),
            tick_ms: timing::TICK_MS,
            settle_ms: timing::SETTLE_MS,
            rng_seed: None,
        }
    }
}

impl NodeConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(role) = std::env::var("ROLE") {
            match role.parse() {
                Ok(parsed) => config.role = parsed,
                Err(_) => tracing::warn!("Invalid ROLE '{}', using default", role),
            }
        }

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(peer) = std::env::var("PEER_ADDRESS") {
            if let Ok(parsed) = peer.parse() {
                config.peer_address = parsed;
            } else {
                tracing::warn!("Invalid PEER_ADDRESS '{}', using default", peer);
            }
        }

        if let Ok(tick) = std::env::var("TICK_MS") {
            match tick.parse::<u64>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.tick_ms = parsed,
                Ok(_) => tracing::warn!("TICK_MS must be 1-1000, using default"),
                Err(_) => tracing::warn!("Invalid TICK_MS '{}', using default", tick),
            }
        }

        if let Ok(settle) = std::env::var("SETTLE_MS") {
            if let Ok(parsed) = settle.parse::<u64>() {
                config.settle_ms = parsed;
            } else {
                tracing::warn!("Invalid SETTLE_MS '{}', using default", settle);
            }
        }

        if let Ok(seed) = std::env::var("RNG_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.rng_seed = Some(parsed);
            } else {
                tracing::warn!("Invalid RNG_SEED '{}', ignoring", seed);
            }
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be > 0".to_string());
        }
        if self.tick_ms == 0 {
            return Err("tick_ms must be > 0".to_string());
        }
        if self.settle_ms < self.tick_ms {
            return Err(format!(
                "settle_ms ({}) must be at least one tick ({}ms)",
                self.settle_ms, self.tick_ms
            ));
        }
        if self.role == NodeRole::Guest && self.peer_address.port() == 0 {
            return Err("peer_address needs a port".to_string());
        }
        Ok(())
    }

    /// Socket the Host listens on
    pub fn bind_socket(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn game_loop_config(&self) -> GameLoopConfig {
        GameLoopConfig {
            role: self.role,
            tick: Duration::from_millis(self.tick_ms),
            settle: Duration::from_millis(self.settle_ms),
            seed: self.rng_seed,
        }
    }
}
