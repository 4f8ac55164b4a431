//! Node session - owns the game loop and is the single writer of game state
//!
//! Inbound handoffs, paddle updates and local input all arrive through the inbox
//! and are applied between ticks, so they never interleave with a physics step.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::game::constants::timing::STATS_INTERVAL_SECS;
use crate::game::game_loop::{Frame, GameLoop, GameLoopConfig};
use crate::game::inbox::{Inbox, InboxSender, NodeCommand};
use crate::game::render::Renderer;
use crate::game::state::{GameState, NodeRole};
use crate::metrics::Metrics;
use crate::net::coordinator::{HandoffCoordinator, HandoffError};
use crate::net::link::Link;

/// Conditions that stop the node
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

pub struct NodeSession {
    game_loop: GameLoop,
    coordinator: HandoffCoordinator,
    inbox: Inbox,
    renderer: Box<dyn Renderer + Send>,
    metrics: Arc<Metrics>,
}

impl NodeSession {
    pub fn new(
        config: GameLoopConfig,
        link: Arc<dyn Link>,
        inbox: Inbox,
        renderer: Box<dyn Renderer + Send>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let coordinator = HandoffCoordinator::new(config.role, link);
        Self {
            game_loop: GameLoop::new(config),
            coordinator,
            inbox,
            renderer,
            metrics,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.coordinator.role()
    }

    pub fn state(&self) -> &GameState {
        self.game_loop.state()
    }

    pub fn game_loop_mut(&mut self) -> &mut GameLoop {
        &mut self.game_loop
    }

    /// Handle for producers outside the game task
    pub fn inbox_sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    /// Commands waiting for the next step
    pub fn pending_commands(&self) -> usize {
        self.inbox.pending_count()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Draw the opening screen
    pub fn start(&mut self) {
        let frame = self.game_loop.start();
        self.render(&frame);
    }

    /// Apply pending commands, run one cycle, render it and submit any handoff
    pub fn step(&mut self) -> Result<Frame, NodeError> {
        for command in self.inbox.drain() {
            self.apply(command);
        }

        let frame = self.game_loop.cycle();
        self.render(&frame);

        if frame.bounced {
            Metrics::incr(&self.metrics.paddle_bounces);
        }
        if frame.missed {
            Metrics::incr(&self.metrics.misses);
        }
        if frame.reset {
            Metrics::incr(&self.metrics.resets);
        }
        if let Some(message) = &frame.handoff {
            self.coordinator.send_handoff(message)?;
            Metrics::incr(&self.metrics.handoffs_sent);
        }

        Ok(frame)
    }

    fn apply(&mut self, command: NodeCommand) {
        match command {
            NodeCommand::HandoffIn(message) => {
                let state = self.game_loop.state_mut();
                if state.has_ball {
                    warn!("Handoff received while holding the ball, overwriting");
                }
                state.apply_handoff_in(&message);
                Metrics::incr(&self.metrics.handoffs_received);
                info!(
                    x = message.x,
                    y = message.y,
                    vx = message.vx,
                    vy = message.vy,
                    "Ball received from peer"
                );
            }
            NodeCommand::PaddleUpdate(y) => {
                self.game_loop.state_mut().update_remote_paddle(y);
                Metrics::incr(&self.metrics.paddle_updates_received);
            }
            NodeCommand::MovePaddle(y) => self.move_local_paddle(y),
            NodeCommand::NudgePaddle(dy) => {
                let y = self.game_loop.state().paddle.position.y + dy;
                self.move_local_paddle(y);
            }
        }
    }

    fn move_local_paddle(&mut self, y: i32) {
        if !self.game_loop.state_mut().move_local_paddle(y) {
            return;
        }
        let y = self.game_loop.state().paddle.position.y;
        if self.coordinator.relay_paddle(y) {
            Metrics::incr(&self.metrics.paddle_updates_sent);
        }
    }

    fn render(&mut self, frame: &Frame) {
        for command in &frame.commands {
            self.renderer.apply(command);
        }
    }
}

/// Run the session at a fixed cadence until a fatal error
pub async fn run_game_loop(mut session: NodeSession, tick: Duration) -> Result<(), NodeError> {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let tick_ms = tick.as_millis().max(1) as u64;
    let stats_every = (STATS_INTERVAL_SECS * 1000 / tick_ms).max(1);

    session.start();
    info!(
        "Game loop started as {} every {}ms (holding ball: {})",
        session.role(),
        tick_ms,
        session.state().has_ball
    );

    loop {
        ticker.tick().await;

        let started = Instant::now();
        session.step()?;
        session.metrics.record_tick_time(started.elapsed());

        if session.game_loop.tick() % stats_every == 0 {
            info!("Node: {}", session.metrics.summary());
        }
    }
}
