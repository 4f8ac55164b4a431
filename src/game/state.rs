//! Game state definitions and structures
//!
//! One node owns a single ball and a single paddle. The ball is only simulated on
//! the node that currently holds it.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::{arena, ball, paddle};
use crate::game::render::Rect;
use crate::game::systems::collision;
use crate::net::protocol::{to_wire_coord, to_wire_speed, HandoffMessage};
use crate::util::ivec2::IVec2;

/// Which side of the link this node plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Starts holding the ball, listens for the peer, and hands off by notification.
    /// Handoff failures are fatal on this side.
    Host,
    /// Starts idle, connects to the Host, and hands off by attribute write
    Guest,
}

impl NodeRole {
    /// Whether this role begins the session holding the ball
    pub fn starts_with_ball(&self) -> bool {
        matches!(self, NodeRole::Host)
    }

    /// Whether a failed outbound handoff must halt this node
    pub fn is_authoritative_sender(&self) -> bool {
        matches!(self, NodeRole::Host)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Host => write!(f, "host"),
            NodeRole::Guest => write!(f, "guest"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" | "peripheral" => Ok(NodeRole::Host),
            "guest" | "central" => Ok(NodeRole::Guest),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Possession state machine: Idle only listens, Active runs the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Possession {
    Idle,
    Active,
}

/// The ball. Position is the top-left corner of a square of side `size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    pub size: i32,
    pub position: IVec2,
    /// Position as of the previous render pass, erased before the next draw
    pub previous_position: IVec2,
    /// Pixels per tick
    pub velocity: IVec2,
}

impl Ball {
    pub fn new(position: IVec2, velocity: IVec2) -> Self {
        Self {
            size: ball::SIZE,
            position,
            previous_position: position,
            velocity,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    pub fn previous_rect(&self) -> Rect {
        Rect::square(self.previous_position, self.size)
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(
            IVec2::new(ball::RESET_X, ball::RESET_Y),
            IVec2::new(ball::RESET_VX, ball::RESET_VY),
        )
    }
}

/// A vertical paddle pinned to its column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paddle {
    pub width: i32,
    pub height: i32,
    pub position: IVec2,
    pub previous_position: IVec2,
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::sized(self.position, self.width, self.height)
    }

    pub fn previous_rect(&self) -> Rect {
        Rect::sized(self.previous_position, self.width, self.height)
    }

    /// Whether the on-screen paddle lags behind its position
    pub fn needs_redraw(&self) -> bool {
        self.previous_position.y != self.position.y
    }

    /// Highest row the paddle's top can take while staying on screen
    pub fn max_y(&self) -> i32 {
        arena::MAX_Y - self.height
    }
}

impl Default for Paddle {
    fn default() -> Self {
        let position = IVec2::new(paddle::X, paddle::RESET_Y);
        Self {
            width: paddle::WIDTH,
            height: paddle::HEIGHT,
            position,
            previous_position: position,
        }
    }
}

/// Result of one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsOutcome {
    /// Ball is on the other node; nothing moved
    Idle,
    /// Ball moved and is still ours
    Moved,
    /// Ball left through the right edge; the payload must go to the peer
    HandoffOut(HandoffMessage),
    /// Ball fell off the left edge; a reset is due after the settle delay
    Missed,
}

/// Complete game state of one node
#[derive(Debug, Clone)]
pub struct GameState {
    pub role: NodeRole,
    pub ball: Ball,
    pub paddle: Paddle,
    /// Sole authority on whether this node advances the ball
    pub has_ball: bool,
    /// Paddle bounces since the last reset; drives horizontal speed
    pub num_bounces: u32,
}

impl GameState {
    pub fn new(role: NodeRole) -> Self {
        let ball = match role {
            NodeRole::Host => Ball::default(),
            NodeRole::Guest => Ball::new(
                IVec2::new(ball::GUEST_START_X, ball::RESET_Y),
                IVec2::new(ball::RESET_VX, ball::RESET_VY),
            ),
        };

        Self {
            role,
            ball,
            paddle: Paddle::default(),
            has_ball: role.starts_with_ball(),
            num_bounces: 0,
        }
    }

    pub fn possession(&self) -> Possession {
        if self.has_ball {
            Possession::Active
        } else {
            Possession::Idle
        }
    }

    /// Advance the ball one tick.
    ///
    /// Order: integrate, wall bounce, paddle bounce, right-edge exit, left-edge miss.
    /// Exit and bounce are both judged against the post-movement position.
    /// `previous_position` is left to the render pass, which knows what was drawn.
    pub fn tick_physics<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PhysicsOutcome {
        if !self.has_ball {
            return PhysicsOutcome::Idle;
        }

        self.ball.position += self.ball.velocity;

        if collision::hits_top_or_bottom_wall(&self.ball) {
            self.ball.velocity = self.ball.velocity.flip_y();
            self.ball.position.y = self.ball.position.y.clamp(0, arena::MAX_Y - self.ball.size);
        }

        if self.ball.velocity.x < 0
            && collision::intersects_paddle_zone(self.ball.position, self.ball.size, &self.paddle)
        {
            let (vy, vx) = collision::resolve_paddle_bounce(
                &self.ball,
                &self.paddle,
                &mut self.num_bounces,
                rng,
            );
            self.ball.velocity = IVec2::new(vx, vy);
        }

        if collision::exits_right_edge(&self.ball) {
            self.has_ball = false;
            return PhysicsOutcome::HandoffOut(self.outbound_payload());
        }

        if collision::exits_left_past_paddle(&self.ball, &self.paddle) {
            return PhysicsOutcome::Missed;
        }

        PhysicsOutcome::Moved
    }

    /// Mirrored ball state for the peer: y flipped across the arena, velocity negated
    pub fn outbound_payload(&self) -> HandoffMessage {
        let velocity = -self.ball.velocity;
        HandoffMessage {
            x: to_wire_coord(arena::ORIGIN_X),
            y: to_wire_coord(arena::MAX_Y - self.ball.position.y),
            vx: to_wire_speed(velocity.x),
            vy: to_wire_speed(velocity.y),
        }
    }

    /// Take possession from an inbound handoff. The ball always enters at the arena
    /// origin column; the payload's `x` is not trusted.
    ///
    /// Not deduplicated: a handoff arriving while we already hold the ball overwrites it.
    /// `previous_position` keeps the last drawn spot so the next pass still erases it.
    pub fn apply_handoff_in(&mut self, message: &HandoffMessage) {
        self.ball.position = IVec2::new(arena::ORIGIN_X, i32::from(message.y));
        self.ball.velocity = IVec2::new(i32::from(message.vx), i32::from(message.vy));
        self.has_ball = true;
    }

    /// Paddle row pushed by the peer, applied as-is
    pub fn update_remote_paddle(&mut self, y: u16) {
        self.paddle.position.y = i32::from(y);
    }

    /// Paddle row from local input, kept on screen. Returns whether it moved.
    pub fn move_local_paddle(&mut self, y: i32) -> bool {
        let y = y.clamp(0, self.paddle.max_y());
        if y == self.paddle.position.y {
            return false;
        }
        self.paddle.position.y = y;
        true
    }

    /// Miss reset: canonical ball, paddle and bounce count. Possession is untouched.
    pub fn reset(&mut self) {
        self.ball.position = IVec2::new(ball::RESET_X, ball::RESET_Y);
        self.ball.velocity = IVec2::new(ball::RESET_VX, ball::RESET_VY);
        self.paddle.position.y = paddle::RESET_Y;
        self.num_bounces = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn host_with_ball(x: i32, y: i32, vx: i32, vy: i32) -> GameState {
        let mut state = GameState::new(NodeRole::Host);
        state.ball = Ball::new(IVec2::new(x, y), IVec2::new(vx, vy));
        state
    }

    #[test]
    fn test_initial_roles() {
        let host = GameState::new(NodeRole::Host);
        assert_eq!(host.possession(), Possession::Active);
        assert_eq!(host.ball.position, IVec2::new(260, 120));

        let guest = GameState::new(NodeRole::Guest);
        assert_eq!(guest.possession(), Possession::Idle);
        assert_eq!(guest.ball.position, IVec2::new(320, 120));
        assert_eq!(guest.paddle.position, IVec2::new(0, 100));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("host".parse::<NodeRole>().unwrap(), NodeRole::Host);
        assert_eq!("Guest".parse::<NodeRole>().unwrap(), NodeRole::Guest);
        assert_eq!("central".parse::<NodeRole>().unwrap(), NodeRole::Guest);
        assert!("referee".parse::<NodeRole>().is_err());
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut state = GameState::new(NodeRole::Guest);
        let before = state.ball.clone();
        assert_eq!(state.tick_physics(&mut rng()), PhysicsOutcome::Idle);
        assert_eq!(state.ball, before);
    }

    #[test]
    fn test_handoff_out_at_right_edge() {
        let mut state = host_with_ball(319, 120, 1, 0);

        let outcome = state.tick_physics(&mut rng());

        assert_eq!(
            outcome,
            PhysicsOutcome::HandoffOut(HandoffMessage {
                x: 0,
                y: 119,
                vx: -1,
                vy: 0
            })
        );
        assert!(!state.has_ball);
        assert_eq!(state.possession(), Possession::Idle);
    }

    #[test]
    fn test_no_bounce_above_paddle_then_miss() {
        let mut state = host_with_ball(5, 50, -1, 0);
        let mut rng = rng();

        assert_eq!(state.tick_physics(&mut rng), PhysicsOutcome::Moved);
        assert_eq!(state.ball.position, IVec2::new(4, 50));
        assert_eq!(state.ball.velocity, IVec2::new(-1, 0));
        assert_eq!(state.num_bounces, 0);

        // Keeps drifting left until fully off-screen at x = -11
        let mut ticks = 1;
        while state.tick_physics(&mut rng) != PhysicsOutcome::Missed {
            ticks += 1;
            assert!(state.ball.position.x > -11);
        }
        assert_eq!(state.ball.position.x, -11);
        assert_eq!(ticks, 15);
        assert!(state.has_ball);
    }

    #[test]
    fn test_wall_reflection() {
        let mut rng = rng();

        let mut top = host_with_ball(100, 1, 1, -2);
        top.tick_physics(&mut rng);
        assert_eq!(top.ball.velocity.y, 2);
        assert_eq!(top.ball.position.y, 0);

        let mut bottom = host_with_ball(100, 228, 1, 2);
        bottom.tick_physics(&mut rng);
        assert_eq!(bottom.ball.velocity.y, -2);
        assert_eq!(bottom.ball.position.y, 229);
    }

    #[test]
    fn test_ball_stays_in_bounds() {
        let mut state = host_with_ball(100, 5, 0, -2);
        let mut rng = rng();
        for _ in 0..1_000 {
            state.tick_physics(&mut rng);
            assert!(state.ball.position.y >= 0);
            assert!(state.ball.position.y <= arena::MAX_Y - state.ball.size);
        }
    }

    #[test]
    fn test_front_bounce_accelerates() {
        let mut state = host_with_ball(12, 120, -1, 0);
        state.tick_physics(&mut rng());

        assert_eq!(state.num_bounces, 1);
        assert_eq!(state.ball.velocity.x, 1);
        assert!((-2..=1).contains(&state.ball.velocity.y));
    }

    #[test]
    fn test_bounce_speed_increments_per_bounce() {
        let mut state = host_with_ball(12, 115, -1, 0);
        let mut rng = rng();

        for k in 1..=5 {
            state.ball.position = IVec2::new(11 + k, 115);
            state.ball.velocity = IVec2::new(-k, 0);
            state.tick_physics(&mut rng);
            assert_eq!(state.num_bounces, k as u32);
            assert_eq!(state.ball.velocity.x, k);
        }
    }

    #[test]
    fn test_rightward_ball_ignores_paddle() {
        let mut state = host_with_ball(5, 120, 1, 0);
        state.tick_physics(&mut rng());
        assert_eq!(state.num_bounces, 0);
    }

    #[test]
    fn test_apply_handoff_in() {
        let mut state = GameState::new(NodeRole::Guest);
        state.apply_handoff_in(&HandoffMessage {
            x: 0,
            y: 119,
            vx: -3,
            vy: 1,
        });

        assert!(state.has_ball);
        assert_eq!(state.ball.position, IVec2::new(0, 119));
        assert_eq!(state.ball.velocity, IVec2::new(-3, 1));
    }

    #[test]
    fn test_duplicate_handoff_last_write_wins() {
        let mut state = GameState::new(NodeRole::Guest);
        state.apply_handoff_in(&HandoffMessage { x: 0, y: 10, vx: -1, vy: 0 });
        state.apply_handoff_in(&HandoffMessage { x: 0, y: 200, vx: -2, vy: 1 });

        assert!(state.has_ball);
        assert_eq!(state.ball.position, IVec2::new(0, 200));
        assert_eq!(state.ball.velocity, IVec2::new(-2, 1));
    }

    #[test]
    fn test_payload_saturates_fast_ball() {
        let mut state = host_with_ball(300, 120, 100_000, 0);
        match state.tick_physics(&mut rng()) {
            PhysicsOutcome::HandoffOut(msg) => assert_eq!(msg.vx, i16::MIN),
            other => panic!("expected handoff, got {:?}", other),
        }
    }

    #[test]
    fn test_handoff_enters_at_origin_column() {
        let mut state = GameState::new(NodeRole::Guest);
        state.apply_handoff_in(&HandoffMessage {
            x: 319,
            y: 119,
            vx: -1,
            vy: 0,
        });

        assert_eq!(state.ball.position, IVec2::new(0, 119));
        assert_eq!(state.ball.velocity, IVec2::new(-1, 0));
    }

    #[test]
    fn test_handoff_keeps_last_drawn_spot() {
        let mut state = host_with_ball(200, 80, -1, 0);
        state.apply_handoff_in(&HandoffMessage {
            x: 0,
            y: 30,
            vx: 2,
            vy: 0,
        });

        assert_eq!(state.ball.previous_position, IVec2::new(200, 80));
        assert_eq!(state.ball.position, IVec2::new(0, 30));
    }

    #[test]
    fn test_paddle_updates() {
        let mut state = GameState::new(NodeRole::Guest);

        state.update_remote_paddle(150);
        assert_eq!(state.paddle.position.y, 150);
        assert!(state.paddle.needs_redraw());

        assert!(state.move_local_paddle(500));
        assert_eq!(state.paddle.position.y, 199);
        assert!(!state.move_local_paddle(199));
        assert!(state.move_local_paddle(-20));
        assert_eq!(state.paddle.position.y, 0);
    }

    #[test]
    fn test_reset_restores_canonical_state() {
        let mut rng = rng();
        for (x, y, vx, vy) in [(-40, 3, -9, 2), (150, 229, 7, -1), (0, 0, 0, 0)] {
            let mut state = host_with_ball(x, y, vx, vy);
            state.num_bounces = 17;
            state.paddle.position.y = 3;
            state.tick_physics(&mut rng);

            state.reset();

            assert_eq!(state.ball.position, IVec2::new(260, 120));
            assert_eq!(state.ball.velocity, IVec2::new(-1, 0));
            assert_eq!(state.paddle.position, IVec2::new(0, 100));
            assert_eq!(state.num_bounces, 0);
        }
    }
}
