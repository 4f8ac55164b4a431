//! Physics/render loop
//!
//! One `cycle()` per tick: advance the ball if we hold it, then work out which
//! rectangles to erase and redraw. A miss schedules the reset as a deferred action
//! counted in ticks, so the settle pause needs no clock.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::game::constants::timing;
use crate::game::render::RenderCommand;
use crate::game::state::{GameState, NodeRole, PhysicsOutcome};
use crate::game::systems::collision;
use crate::net::protocol::HandoffMessage;

/// Render commands of one cycle (six at most)
pub type FrameCommands = SmallVec<[RenderCommand; 8]>;

/// Game loop configuration
#[derive(Debug, Clone)]
pub struct GameLoopConfig {
    pub role: NodeRole,
    /// Loop cadence
    pub tick: Duration,
    /// Pause between a miss and its reset
    pub settle: Duration,
    /// Fixed seed for bounce randomness; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::Host,
            tick: Duration::from_millis(timing::TICK_MS),
            settle: Duration::from_millis(timing::SETTLE_MS),
            seed: None,
        }
    }
}

impl GameLoopConfig {
    /// Number of cycles the settle pause spans (at least one)
    pub fn settle_ticks(&self) -> u32 {
        let tick = self.tick.as_millis().max(1);
        let ticks = self.settle.as_millis() / tick;
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}

/// Output of one cycle
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub commands: FrameCommands,
    /// Ball left through the right edge; must be handed to the peer
    pub handoff: Option<HandoffMessage>,
    /// Ball fell off the left edge this cycle
    pub missed: bool,
    /// Deferred miss reset ran this cycle
    pub reset: bool,
    /// Ball bounced off the paddle this cycle
    pub bounced: bool,
}

/// Drives one node's game state tick by tick
pub struct GameLoop {
    state: GameState,
    rng: StdRng,
    settle_ticks: u32,
    /// Cycles left before a scheduled miss reset
    pending_reset: Option<u32>,
    tick: u64,
}

impl GameLoop {
    pub fn new(config: GameLoopConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: GameState::new(config.role),
            rng,
            settle_ticks: config.settle_ticks(),
            pending_reset: None,
            tick: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn reset_pending(&self) -> bool {
        self.pending_reset.is_some()
    }

    /// First frame: blank screen with the paddle drawn
    pub fn start(&mut self) -> Frame {
        let mut frame = Frame::default();
        frame.commands.push(RenderCommand::ClearScreen);
        frame.commands.push(RenderCommand::Fill(self.state.paddle.rect()));
        self.state.paddle.previous_position = self.state.paddle.position;
        frame
    }

    /// Run one tick
    pub fn cycle(&mut self) -> Frame {
        let mut frame = Frame::default();
        self.tick += 1;

        if let Some(remaining) = self.pending_reset {
            if remaining > 1 {
                self.pending_reset = Some(remaining - 1);
            } else {
                self.pending_reset = None;
                self.state.reset();
                self.redraw_paddle(&mut frame.commands);
                frame.reset = true;
                info!("Ball reset after miss");
            }
        } else if self.state.has_ball {
            self.advance_ball(&mut frame);
        }

        // Reflects paddle moves made while the ball is elsewhere
        if self.state.paddle.needs_redraw() {
            self.redraw_paddle(&mut frame.commands);
        }

        frame
    }

    fn advance_ball(&mut self, frame: &mut Frame) {
        let bounces_before = self.state.num_bounces;
        let outcome = self.state.tick_physics(&mut self.rng);
        frame.bounced = self.state.num_bounces != bounces_before;

        let ball = &self.state.ball;
        frame.commands.push(RenderCommand::Clear(ball.previous_rect()));

        // Erasing the old ball may have cut into the paddle
        if collision::intersects_paddle_zone(ball.previous_position, ball.size, &self.state.paddle) {
            self.redraw_paddle(&mut frame.commands);
        }

        match outcome {
            PhysicsOutcome::Moved => {
                frame
                    .commands
                    .push(RenderCommand::Fill(self.state.ball.rect()));
                if frame.bounced {
                    debug!(
                        bounces = self.state.num_bounces,
                        vx = self.state.ball.velocity.x,
                        vy = self.state.ball.velocity.y,
                        "Paddle bounce"
                    );
                }
            }
            PhysicsOutcome::HandoffOut(message) => {
                frame.handoff = Some(message);
            }
            PhysicsOutcome::Missed => {
                self.pending_reset = Some(self.settle_ticks);
                frame.missed = true;
                info!(bounces = self.state.num_bounces, "Ball missed, reset scheduled");
            }
            PhysicsOutcome::Idle => {}
        }

        // The next pass erases whatever this one left on screen
        self.state.ball.previous_position = self.state.ball.position;
    }

    fn redraw_paddle(&mut self, commands: &mut FrameCommands) {
        let paddle = &mut self.state.paddle;
        commands.push(RenderCommand::Clear(paddle.previous_rect()));
        commands.push(RenderCommand::Fill(paddle.rect()));
        paddle.previous_position.y = paddle.position.y;
    }
}
