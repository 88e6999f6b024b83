//! Collision detection and response
//!
//! Everything is axis-aligned: the ball is treated as the bounding box of
//! its circle. These functions only look at the records they are handed;
//! score, lives and phase bookkeeping happens in the frame step.

use glam::Vec2;

use super::layout::BrickLayout;
use super::state::{Ball, Brick, Paddle, Penetration};
use crate::config::PenetrationConfig;

/// Which walls the ball bounced off this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top
    }
}

/// Reflect off the left, right and top walls.
///
/// A wall only flips the velocity component heading into it, and the ball
/// is put back inside the field, so a single crossing flips exactly once
/// even when the overshoot is larger than one frame of travel.
pub fn resolve_walls(ball: &mut Ball, field_width: f32) -> WallHit {
    let mut hit = WallHit::default();

    if ball.left() < 0.0 {
        ball.pos.x = ball.radius;
        if ball.vel.x < 0.0 {
            ball.vel.x = -ball.vel.x;
            hit.left = true;
        }
    } else if ball.right() > field_width {
        ball.pos.x = field_width - ball.radius;
        if ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x;
            hit.right = true;
        }
    }

    if ball.top() < 0.0 {
        ball.pos.y = ball.radius;
        if ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y;
            hit.top = true;
        }
    }

    hit
}

/// Check for paddle contact: the ball's bottom has reached the paddle top
/// and its center is strictly between the paddle edges.
///
/// Returns the normalized hit offset, -1 at the left edge, 0 at the
/// center, 1 at the right edge.
pub fn paddle_contact(ball: &Ball, paddle: &Paddle) -> Option<f32> {
    let touching = ball.bottom() >= paddle.pos.y
        && ball.pos.x > paddle.pos.x
        && ball.pos.x < paddle.right();
    if !touching {
        return None;
    }
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return Some(0.0);
    }
    Some(((ball.pos.x - paddle.center_x()) / half).clamp(-1.0, 1.0))
}

/// Steering applied by an angled paddle bounce
#[derive(Debug, Clone, Copy)]
pub struct AngledBounce {
    /// Deflection at the paddle edge, radians from vertical
    pub max_angle: f32,
    /// Speed the ball leaves with
    pub speed: f32,
}

/// Send the ball back up from the paddle.
///
/// The ball is placed exactly on the paddle top so it cannot register the
/// same contact twice. Without `angled` only the vertical direction flips
/// upward; with it the direction comes from `offset` and the speed is reset.
pub fn bounce_off_paddle(
    ball: &mut Ball,
    paddle: &Paddle,
    offset: f32,
    angled: Option<AngledBounce>,
) {
    ball.pos.y = paddle.pos.y - ball.radius;
    match angled {
        Some(bounce) => {
            let angle = offset.clamp(-1.0, 1.0) * bounce.max_angle;
            ball.vel = Vec2::new(angle.sin(), -angle.cos()) * bounce.speed;
            ball.speed = bounce.speed;
        }
        None => {
            ball.vel.y = -ball.vel.y.abs();
        }
    }
}

/// Penetration power for the current paddle width: the narrower the
/// paddle, the more bricks the ball may destroy before it turns.
pub fn penetration_power(paddle: &Paddle, config: &PenetrationConfig) -> u32 {
    let Some(width_ratio) = paddle.width_ratio() else {
        return config.fallback_power;
    };
    let span = config.max_power.saturating_sub(config.min_power) as f32;
    (config.min_power as f32 + (1.0 - width_ratio) * span).round() as u32
}

/// Normalized penetration strength in [0, 1]: 0 at default width, 1 at
/// minimum width. Zero when the paddle cannot change width.
pub fn power_ratio(paddle: &Paddle) -> f32 {
    paddle.width_ratio().map_or(0.0, |ratio| 1.0 - ratio)
}

/// Strict bounding-box overlap between the ball and a brick cell
pub fn ball_overlaps_brick(ball: &Ball, brick: &Brick, layout: &BrickLayout) -> bool {
    ball.right() > brick.pos.x
        && ball.left() < brick.pos.x + layout.cell_width
        && ball.bottom() > brick.pos.y
        && ball.top() < brick.pos.y + layout.cell_height
}

/// Count a destroyed brick against the held penetration and decide whether
/// the ball should turn around.
///
/// Without penetration every brick reflects. With it the ball turns only
/// once `power` bricks have gone, and only while moving upward: a falling
/// ball keeps ploughing down. Reaching the threshold restarts the count
/// either way.
pub fn register_brick_hit(
    penetration: &mut Penetration,
    config: Option<&PenetrationConfig>,
    ball_dy: f32,
) -> bool {
    penetration.destroyed += 1;
    if config.is_none() {
        penetration.destroyed = 0;
        return true;
    }
    if penetration.destroyed >= penetration.power {
        penetration.destroyed = 0;
        return ball_dy < 0.0;
    }
    false
}

/// The ball's bottom edge has left the playfield
pub fn ball_lost(ball: &Ball, field_height: f32) -> bool {
    ball.bottom() > field_height
}
