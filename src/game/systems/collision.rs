//! Ball-vs-wall and ball-vs-paddle tests
//!
//! Pure functions over a snapshot of the ball and paddle. No state.

use rand::Rng;

use crate::game::constants::{arena, bounce, paddle::ZONE_PADDING};
use crate::game::state::{Ball, Paddle};
use crate::util::ivec2::IVec2;

/// Where on the paddle a bouncing ball made contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleContact {
    /// Ball is level with or in front of the paddle face
    Front,
    /// Ball overlaps the paddle's top edge
    TopEdge,
    /// Ball overlaps the paddle's bottom edge
    BottomEdge,
    /// Ball is behind the face but inside the paddle's rows; vertical speed is kept
    Behind,
}

/// True when the ball touches or crosses the top or bottom wall
#[inline]
pub fn hits_top_or_bottom_wall(ball: &Ball) -> bool {
    ball.position.y <= 0 || ball.position.y >= arena::MAX_Y - ball.size
}

/// True when the ball is leaving through the right edge
#[inline]
pub fn exits_right_edge(ball: &Ball) -> bool {
    ball.position.x >= arena::MAX_X && ball.velocity.x > 0
}

/// True when the ball has fallen fully off the left edge.
///
/// The paddle's extent does not gate this: any ball left of the arena is a miss.
#[inline]
pub fn exits_left_past_paddle(ball: &Ball, _paddle: &Paddle) -> bool {
    ball.position.x + ball.size < 0
}

/// Whether a ball box at `ball_pos` overlaps the paddle box grown by one pixel.
///
/// Only the right, top and bottom sides are tested; there is nothing left of the paddle.
#[inline]
pub fn intersects_paddle_zone(ball_pos: IVec2, ball_size: i32, paddle: &Paddle) -> bool {
    let zone_right = paddle.position.x + paddle.width + ZONE_PADDING;
    let zone_bottom = paddle.position.y + paddle.height + ZONE_PADDING;

    !(ball_pos.x > zone_right)
        && !(ball_pos.y + ball_size + ZONE_PADDING < paddle.position.y)
        && !(zone_bottom < ball_pos.y)
}

/// Classify the contact point of a ball already inside the paddle zone
pub fn paddle_contact(ball: &Ball, paddle: &Paddle) -> PaddleContact {
    if ball.position.x >= paddle.position.x + paddle.width {
        PaddleContact::Front
    } else if ball.position.y <= paddle.position.y {
        PaddleContact::TopEdge
    } else if ball.position.y + ball.size >= paddle.position.y + paddle.height {
        PaddleContact::BottomEdge
    } else {
        PaddleContact::Behind
    }
}

/// Compute the bounce response for a ball moving left into the paddle zone.
///
/// Increments `bounce_count` and returns `(new_vy, new_vx)`, where the new horizontal
/// speed is the updated bounce count. Speed is not clamped.
pub fn resolve_paddle_bounce<R: Rng + ?Sized>(
    ball: &Ball,
    paddle: &Paddle,
    bounce_count: &mut u32,
    rng: &mut R,
) -> (i32, i32) {
    let new_vy = match paddle_contact(ball, paddle) {
        PaddleContact::Front => rng.gen_range(bounce::FRONT_VY_MIN..=bounce::FRONT_VY_MAX),
        PaddleContact::TopEdge => bounce::TOP_EDGE_VY,
        PaddleContact::BottomEdge => bounce::BOTTOM_EDGE_VY,
        PaddleContact::Behind => ball.velocity.y,
    };

    *bounce_count = bounce_count.saturating_add(1);
    let new_vx = i32::try_from(*bounce_count).unwrap_or(i32::MAX);

    (new_vy, new_vx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ball_at(x: i32, y: i32, vx: i32, vy: i32) -> Ball {
        let mut ball = Ball::default();
        ball.position = IVec2::new(x, y);
        ball.previous_position = ball.position;
        ball.velocity = IVec2::new(vx, vy);
        ball
    }

    fn paddle_at(y: i32) -> Paddle {
        let mut paddle = Paddle::default();
        paddle.position.y = y;
        paddle.previous_position.y = y;
        paddle
    }

    #[test]
    fn test_wall_hits() {
        assert!(hits_top_or_bottom_wall(&ball_at(100, 0, 1, -1)));
        assert!(hits_top_or_bottom_wall(&ball_at(100, -1, 1, -1)));
        assert!(hits_top_or_bottom_wall(&ball_at(100, 229, 1, 1)));
        assert!(!hits_top_or_bottom_wall(&ball_at(100, 1, 1, 1)));
        assert!(!hits_top_or_bottom_wall(&ball_at(100, 228, 1, 1)));
    }

    #[test]
    fn test_exit_right_requires_rightward_motion() {
        assert!(exits_right_edge(&ball_at(319, 120, 1, 0)));
        assert!(exits_right_edge(&ball_at(325, 120, 3, 0)));
        assert!(!exits_right_edge(&ball_at(319, 120, -1, 0)));
        assert!(!exits_right_edge(&ball_at(318, 120, 1, 0)));
    }

    #[test]
    fn test_miss_ignores_paddle_position() {
        let paddle = paddle_at(100);
        assert!(!exits_left_past_paddle(&ball_at(-10, 120, -1, 0), &paddle));
        assert!(exits_left_past_paddle(&ball_at(-11, 120, -1, 0), &paddle));
        // Level with the paddle still counts
        assert!(exits_left_past_paddle(&ball_at(-11, 110, -1, 0), &paddle));
    }

    #[test]
    fn test_zone_above_paddle() {
        // Ball at y=50 ends at 60, far above a paddle starting at 100
        let paddle = paddle_at(100);
        assert!(!intersects_paddle_zone(IVec2::new(4, 50), 10, &paddle));
    }

    #[test]
    fn test_zone_padding_edges() {
        let paddle = paddle_at(100);
        // Right side: face at 10, zone extends to 11
        assert!(intersects_paddle_zone(IVec2::new(11, 110), 10, &paddle));
        assert!(!intersects_paddle_zone(IVec2::new(12, 110), 10, &paddle));
        // Top: ball bottom + 1 must reach 100
        assert!(intersects_paddle_zone(IVec2::new(5, 89), 10, &paddle));
        assert!(!intersects_paddle_zone(IVec2::new(5, 88), 10, &paddle));
        // Bottom: paddle ends at 140, zone at 141
        assert!(intersects_paddle_zone(IVec2::new(5, 141), 10, &paddle));
        assert!(!intersects_paddle_zone(IVec2::new(5, 142), 10, &paddle));
    }

    #[test]
    fn test_contact_classification() {
        let paddle = paddle_at(100);
        assert_eq!(paddle_contact(&ball_at(10, 120, -1, 0), &paddle), PaddleContact::Front);
        assert_eq!(paddle_contact(&ball_at(5, 95, -1, 0), &paddle), PaddleContact::TopEdge);
        assert_eq!(paddle_contact(&ball_at(5, 131, -1, 0), &paddle), PaddleContact::BottomEdge);
        assert_eq!(paddle_contact(&ball_at(5, 115, -1, 0), &paddle), PaddleContact::Behind);
    }

    #[test]
    fn test_front_bounce_range() {
        let paddle = paddle_at(100);
        let ball = ball_at(10, 120, -1, 0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut count = 0;
        let mut seen = std::collections::HashSet::new();

        for _ in 0..200 {
            let (vy, _) = resolve_paddle_bounce(&ball, &paddle, &mut count, &mut rng);
            assert!((bounce::FRONT_VY_MIN..=bounce::FRONT_VY_MAX).contains(&vy));
            seen.insert(vy);
        }
        assert_eq!(seen.len(), 4);
        assert!(!seen.contains(&2));
    }

    #[test]
    fn test_edge_bounces_are_fixed() {
        let paddle = paddle_at(100);
        let mut rng = StdRng::seed_from_u64(1);
        let mut count = 0;

        for _ in 0..20 {
            let (vy, _) = resolve_paddle_bounce(&ball_at(5, 95, -1, 1), &paddle, &mut count, &mut rng);
            assert_eq!(vy, -2);
            let (vy, _) = resolve_paddle_bounce(&ball_at(5, 135, -1, -1), &paddle, &mut count, &mut rng);
            assert_eq!(vy, 1);
        }
    }

    #[test]
    fn test_behind_face_keeps_vertical_speed() {
        let paddle = paddle_at(100);
        let mut rng = StdRng::seed_from_u64(1);
        let mut count = 4;

        let (vy, vx) = resolve_paddle_bounce(&ball_at(5, 115, -5, 2), &paddle, &mut count, &mut rng);
        assert_eq!(vy, 2);
        assert_eq!(vx, 5);
    }

    #[test]
    fn test_speed_tracks_bounce_count() {
        let paddle = paddle_at(100);
        let ball = ball_at(10, 120, -1, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut count = 0;

        for k in 1..=25u32 {
            let (_, vx) = resolve_paddle_bounce(&ball, &paddle, &mut count, &mut rng);
            assert_eq!(count, k);
            assert_eq!(vx, k as i32);
        }
    }

    #[test]
    fn test_bounce_count_saturates() {
        let paddle = paddle_at(100);
        let ball = ball_at(10, 120, -1, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut count = u32::MAX;

        let (_, vx) = resolve_paddle_bounce(&ball, &paddle, &mut count, &mut rng);
        assert_eq!(count, u32::MAX);
        assert_eq!(vx, i32::MAX);
    }
}
