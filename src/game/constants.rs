/// Arena geometry, shared by both nodes and immutable at runtime
pub mod arena {
    /// Arena width in pixels
    pub const WIDTH: i32 = 320;
    /// Arena height in pixels
    pub const HEIGHT: i32 = 240;
    /// Last addressable column
    pub const MAX_X: i32 = WIDTH - 1;
    /// Last addressable row (also the axis the handoff mirrors across)
    pub const MAX_Y: i32 = HEIGHT - 1;
    /// Column where an inbound ball is re-injected
    pub const ORIGIN_X: i32 = 0;
}

/// Ball defaults
pub mod ball {
    /// Side length of the square ball
    pub const SIZE: i32 = 10;
    /// Position restored by a miss reset (also the Host's start position)
    pub const RESET_X: i32 = 260;
    pub const RESET_Y: i32 = 120;
    /// Velocity restored by a miss reset
    pub const RESET_VX: i32 = -1;
    pub const RESET_VY: i32 = 0;
    /// Where the Guest parks its ball before the first handoff (just off-screen)
    pub const GUEST_START_X: i32 = 320;
}

/// Paddle defaults
pub mod paddle {
    pub const WIDTH: i32 = 10;
    pub const HEIGHT: i32 = 40;
    /// Paddles never move horizontally
    pub const X: i32 = 0;
    pub const RESET_Y: i32 = 100;
    /// Padding around the paddle box used by the bounce and redraw tests
    pub const ZONE_PADDING: i32 = 1;
    /// Step applied by the `u`/`d` console commands
    pub const NUDGE: i32 = 5;
}

/// Paddle bounce responses
///
/// The side-edge values come from `rand() % 1` expressions, which are always zero,
/// so they never vary. Kept as-is until the intended range is confirmed.
pub mod bounce {
    /// Front face: `rand() % 4 - 2`, so `-2..=1`. `+2` is deliberately unreachable.
    pub const FRONT_VY_MIN: i32 = -2;
    pub const FRONT_VY_MAX: i32 = 1;
    /// Top edge: `rand() % 1 - 2`
    pub const TOP_EDGE_VY: i32 = -2;
    /// Bottom edge: `rand() % 1 + 1`
    pub const BOTTOM_EDGE_VY: i32 = 1;
}

/// Loop cadence
pub mod timing {
    /// Delay between loop iterations
    pub const TICK_MS: u64 = 10;
    /// Pause between a miss and the reset it schedules
    pub const SETTLE_MS: u64 = 1000;
    /// Interval between periodic stats lines
    pub const STATS_INTERVAL_SECS: u64 = 30;
}

/// Link constants
pub mod net {
    /// Largest framed link message (tag + handoff payload fits easily)
    pub const MAX_MESSAGE_SIZE: usize = 64;
    /// Inbox capacity between the link and the game task
    pub const INBOX_CAPACITY: usize = 256;
    /// Delay between Guest connection attempts
    pub const CONNECT_RETRY_MS: u64 = 1000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_bounds() {
        assert_eq!(arena::MAX_X, 319);
        assert_eq!(arena::MAX_Y, 239);
    }

    #[test]
    fn test_settle_is_whole_ticks() {
        assert_eq!(timing::SETTLE_MS % timing::TICK_MS, 0);
        assert_eq!(timing::SETTLE_MS / timing::TICK_MS, 100);
    }

    #[test]
    fn test_reset_position_inside_arena() {
        assert!(ball::RESET_X + ball::SIZE <= arena::MAX_X);
        assert!(ball::RESET_Y <= arena::MAX_Y - ball::SIZE);
        assert!(paddle::RESET_Y + paddle::HEIGHT <= arena::MAX_Y);
    }
}
