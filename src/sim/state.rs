//! Game state and core simulation types
//!
//! One `GameState` is one round. It owns every entity; nothing else
//! mutates them except the frame step and the restart/resize entry points.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::penetration_power;
use super::layout::{BrickLayout, build_bricks};
use crate::config::{GameConfig, PaddleConfig, validate_playfield};
use crate::consts::REFERENCE_WIDTH;
use crate::error::ConfigError;

/// Number of entries in the brick palette
pub const PALETTE_LEN: u8 = 7;

/// Seed increment between restarts so every new board is different
const RESTART_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball resting on the paddle, waiting for a start trigger
    Waiting,
    /// Active gameplay
    Playing,
    /// Lives exhausted
    GameOver,
    /// Every brick destroyed
    Cleared,
}

impl GamePhase {
    /// Terminal phases only leave through a restart
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Cleared)
    }
}

/// Things that happened during a frame, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Restarted,
    WallBounce,
    /// Normalized hit offset across the paddle, -1 (left) to 1 (right)
    PaddleHit { offset: f32 },
    BrickDestroyed {
        row: u32,
        col: u32,
        center: Vec2,
        color: BrickColor,
    },
    LifeLost { lives_left: u8 },
    GameOver,
    Cleared,
}

/// Palette index of a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrickColor(pub u8);

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal velocity in pixels per reference frame
    pub dx: f32,
    pub max_speed: f32,
    pub default_width: f32,
    pub min_width: f32,
    /// Squeezed all the way down while still pressed (drives the flash)
    pub at_min_width: bool,
}

impl Paddle {
    pub fn new(config: &PaddleConfig, scale: f32, field_width: f32, field_height: f32) -> Self {
        let width = config.width * scale;
        Self {
            pos: Vec2::new(
                field_width / 2.0 - width / 2.0,
                field_height - config.bottom_offset * scale,
            ),
            width,
            height: config.height * scale,
            dx: 0.0,
            max_speed: config.speed * scale,
            default_width: width,
            min_width: config.min_width * scale,
            at_min_width: false,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    /// Keep the paddle fully inside the playfield
    pub fn clamp(&mut self, field_width: f32) {
        let max_x = (field_width - self.width).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Center the paddle on `x` (pointer follow)
    pub fn set_center_x(&mut self, x: f32, field_width: f32) {
        self.pos.x = x - self.width / 2.0;
        self.clamp(field_width);
    }

    /// Move by a relative amount (touch drag)
    pub fn nudge(&mut self, delta: f32, field_width: f32) {
        self.pos.x += delta;
        self.clamp(field_width);
    }

    /// Where the current width sits between min (0) and default (1).
    /// `None` when the two are equal.
    pub fn width_ratio(&self) -> Option<f32> {
        let range = self.default_width - self.min_width;
        if range <= f32::EPSILON {
            return None;
        }
        Some(((self.width - self.min_width) / range).clamp(0.0, 1.0))
    }

    /// Squeeze while pressed, relax while released. Linear over the
    /// configured durations, center preserved.
    pub fn ease_width(
        &mut self,
        pressed: bool,
        dt: f32,
        shrink_secs: f32,
        expand_secs: f32,
        field_width: f32,
    ) {
        let range = self.default_width - self.min_width;
        let old_width = self.width;

        if pressed {
            if self.width > self.min_width {
                let rate = range / shrink_secs * dt;
                self.width = (self.width - rate).max(self.min_width);
                self.at_min_width = false;
            } else {
                self.at_min_width = true;
            }
        } else {
            if self.width < self.default_width {
                let rate = range / expand_secs * dt;
                self.width = (self.width + rate).min(self.default_width);
            }
            self.at_min_width = false;
        }

        if self.width != old_width {
            self.pos.x += (old_width - self.width) / 2.0;
            self.clamp(field_width);
        }
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Center
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub radius: f32,
    /// Intended velocity magnitude; only changed on reset or paddle bounce
    pub speed: f32,
}

impl Ball {
    pub fn new(radius: f32, launch: Vec2, paddle: &Paddle) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: launch,
            radius,
            speed: launch.length(),
        };
        ball.rest_on(paddle);
        ball
    }

    /// Sit centered on top of the paddle
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.pos.y - self.radius);
    }

    /// Back onto the paddle with the canonical launch vector
    pub fn reset(&mut self, paddle: &Paddle, launch: Vec2) {
        self.rest_on(paddle);
        self.vel = launch;
        self.speed = launch.length();
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.radius
    }
}

/// A brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Top-left corner
    pub pos: Vec2,
    pub row: u32,
    pub col: u32,
    pub visible: bool,
    pub color: BrickColor,
}

/// Held penetration power and the bricks destroyed against it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penetration {
    /// Bricks the ball may destroy before it is forced to turn; recorded
    /// at launch and on every paddle contact
    pub power: u32,
    /// Destroyed since the last reflection or paddle contact
    pub destroyed: u32,
}

/// Complete round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    /// Seed for brick colors; advanced on restart
    pub seed: u64,
    /// Playfield size
    pub width: f32,
    pub height: f32,
    /// Playfield width over the reference width
    pub scale: f32,
    pub phase: GamePhase,
    pub score: u32,
    pub lives: u8,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Row-major
    pub bricks: Vec<Brick>,
    pub layout: BrickLayout,
    /// Visible bricks left
    pub remaining: usize,
    pub penetration: Penetration,
    /// Frames stepped this round
    pub frame: u64,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh round for a playfield
    pub fn new(config: GameConfig, width: f32, height: f32, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_playfield(width, height)?;
        Ok(Self::build(config, width, height, seed))
    }

    fn build(config: GameConfig, width: f32, height: f32, seed: u64) -> Self {
        let scale = width / REFERENCE_WIDTH;
        let paddle = Paddle::new(&config.paddle, scale, width, height);
        let ball = Ball::new(
            config.ball.radius * scale,
            Self::launch_vector(&config, scale),
            &paddle,
        );
        let layout = BrickLayout::from_spec(&config.grid, width, height, scale);
        let mut rng = Pcg32::seed_from_u64(seed);
        let bricks = build_bricks(&layout, config.colors, &mut rng);
        let remaining = bricks.len();
        let power = config
            .penetration
            .as_ref()
            .map_or(1, |pen| penetration_power(&paddle, pen));

        Self {
            lives: config.lives,
            config,
            seed,
            width,
            height,
            scale,
            phase: GamePhase::Waiting,
            score: 0,
            paddle,
            ball,
            bricks,
            layout,
            remaining,
            penetration: Penetration {
                power,
                destroyed: 0,
            },
            frame: 0,
            events: Vec::new(),
        }
    }

    fn launch_vector(config: &GameConfig, scale: f32) -> Vec2 {
        Vec2::new(config.ball.launch_dx, config.ball.launch_dy) * scale
    }

    /// Canonical launch velocity at the current scale
    pub fn launch(&self) -> Vec2 {
        Self::launch_vector(&self.config, self.scale)
    }

    /// Speed of the canonical launch vector; angled bounces scale from it
    pub fn base_speed(&self) -> f32 {
        self.launch().length()
    }

    /// Throw the round away and deal a new board on the same playfield
    pub fn restart(&mut self) {
        let seed = self.seed.wrapping_add(RESTART_SEED_STEP);
        let config = self.config.clone();
        let mut events = std::mem::take(&mut self.events);
        *self = Self::build(config, self.width, self.height, seed);
        events.push(GameEvent::Restarted);
        self.events = events;
        log::info!("Round restarted (seed {})", seed);
    }

    /// Refit the round to a new playfield size. Called between frames only.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        validate_playfield(width, height)?;
        let sx = width / self.width;
        let sy = height / self.height;
        let new_scale = width / REFERENCE_WIDTH;
        let k = new_scale / self.scale;

        let paddle_center = self.paddle.center_x() * sx;
        let p = &mut self.paddle;
        p.width *= k;
        p.default_width *= k;
        p.min_width *= k;
        p.height *= k;
        p.max_speed *= k;
        p.dx *= k;
        p.pos.y = height - self.config.paddle.bottom_offset * new_scale;
        p.set_center_x(paddle_center, width);

        let b = &mut self.ball;
        b.pos = Vec2::new(b.pos.x * sx, b.pos.y * sy);
        b.vel *= k;
        b.speed *= k;
        b.radius = self.config.ball.radius * new_scale;

        self.layout = self
            .layout
            .rescaled(&self.config.grid, width, height, new_scale);
        for brick in &mut self.bricks {
            brick.pos = self.layout.origin(brick.row, brick.col);
        }

        self.width = width;
        self.height = height;
        self.scale = new_scale;

        if self.phase == GamePhase::Waiting {
            self.ball.rest_on(&self.paddle);
        }
        log::info!("Playfield resized to {}x{}", width, height);
        Ok(())
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn remaining_bricks(&self) -> usize {
        self.remaining
    }

    /// Total bricks dealt this round
    pub fn total_bricks(&self) -> usize {
        self.bricks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_state() -> GameState {
        GameState::new(GameConfig::default(), 800.0, 600.0, 42).unwrap()
    }

    #[test]
    fn test_new_round_layout() {
        let state = reference_state();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.remaining_bricks(), 45);
        assert_eq!(state.total_bricks(), 45);

        // Paddle centered, 30 px above the bottom
        assert_eq!(state.paddle.center_x(), 400.0);
        assert_eq!(state.paddle.pos.y, 570.0);

        // Ball resting on the paddle center
        assert_eq!(state.ball.pos, Vec2::new(400.0, 562.0));
        assert_eq!(state.ball.vel, Vec2::new(4.0, -4.0));
    }

    #[test]
    fn test_new_round_rejects_bad_playfield() {
        assert!(GameState::new(GameConfig::default(), 0.0, 600.0, 1).is_err());
    }

    #[test]
    fn test_scaled_round() {
        let state = GameState::new(GameConfig::default(), 400.0, 600.0, 1).unwrap();
        assert_eq!(state.scale, 0.5);
        assert_eq!(state.paddle.width, 75.0);
        assert_eq!(state.ball.radius, 4.0);
        assert_eq!(state.ball.vel, Vec2::new(2.0, -2.0));
    }

    #[test]
    fn test_paddle_clamp() {
        let mut state = reference_state();
        state.paddle.set_center_x(-500.0, 800.0);
        assert_eq!(state.paddle.pos.x, 0.0);
        state.paddle.set_center_x(5000.0, 800.0);
        assert_eq!(state.paddle.right(), 800.0);
        state.paddle.nudge(-10.0, 800.0);
        assert_eq!(state.paddle.right(), 790.0);
    }

    #[test]
    fn test_paddle_shrinks_over_shrink_duration() {
        let mut paddle = reference_state().paddle;
        let center = paddle.center_x();
        // Half the shrink duration removes half the range
        paddle.ease_width(true, 0.75, 1.5, 0.5, 800.0);
        assert!((paddle.width - 100.0).abs() < 0.001);
        assert!((paddle.center_x() - center).abs() < 0.001);
        assert!(!paddle.at_min_width);

        paddle.ease_width(true, 10.0, 1.5, 0.5, 800.0);
        assert_eq!(paddle.width, paddle.min_width);
        // One more pressed frame at the floor lights the flash
        paddle.ease_width(true, 0.016, 1.5, 0.5, 800.0);
        assert!(paddle.at_min_width);
    }

    #[test]
    fn test_paddle_expands_faster_than_it_shrinks() {
        let mut paddle = reference_state().paddle;
        paddle.ease_width(true, 10.0, 1.5, 0.5, 800.0);
        paddle.ease_width(false, 0.25, 1.5, 0.5, 800.0);
        assert!((paddle.width - 100.0).abs() < 0.001);
        assert!(!paddle.at_min_width);
        paddle.ease_width(false, 1.0, 1.5, 0.5, 800.0);
        assert_eq!(paddle.width, paddle.default_width);
    }

    #[test]
    fn test_paddle_width_change_at_wall_stays_in_bounds() {
        let mut paddle = reference_state().paddle;
        paddle.ease_width(true, 10.0, 1.5, 0.5, 800.0);
        paddle.set_center_x(0.0, 800.0);
        assert_eq!(paddle.pos.x, 0.0);
        paddle.ease_width(false, 10.0, 1.5, 0.5, 800.0);
        assert_eq!(paddle.pos.x, 0.0);
        assert_eq!(paddle.width, paddle.default_width);
    }

    #[test]
    fn test_width_ratio_zero_range() {
        let mut config = GameConfig::default();
        config.paddle.min_width = config.paddle.width;
        let state = GameState::new(config, 800.0, 600.0, 1).unwrap();
        assert_eq!(state.paddle.width_ratio(), None);
    }

    #[test]
    fn test_restart_deals_fresh_round() {
        let mut state = reference_state();
        state.score = 120;
        state.lives = 1;
        state.phase = GamePhase::GameOver;
        state.bricks[0].visible = false;
        state.remaining -= 1;

        state.restart();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.remaining_bricks(), 45);
        assert!(state.bricks.iter().all(|b| b.visible));
        assert_ne!(state.seed, 42);
        assert_eq!(state.drain_events(), vec![GameEvent::Restarted]);
    }

    #[test]
    fn test_resize_rescales_geometry() {
        let mut state = reference_state();
        state.bricks[3].visible = false;
        state.resize(400.0, 300.0).unwrap();

        assert_eq!(state.scale, 0.5);
        assert_eq!(state.paddle.width, 75.0);
        assert_eq!(state.paddle.pos.y, 285.0);
        assert_eq!(state.paddle.center_x(), 200.0);
        assert_eq!(state.ball.radius, 4.0);
        assert_eq!(state.ball.vel, Vec2::new(2.0, -2.0));
        // Waiting ball follows the paddle
        assert_eq!(state.ball.pos, Vec2::new(200.0, 281.0));
        // Visibility survives, positions follow the new layout
        assert!(!state.bricks[3].visible);
        assert_eq!(state.bricks[1].pos, Vec2::new(45.0, 30.0));
    }

    #[test]
    fn test_resize_rejects_zero() {
        let mut state = reference_state();
        assert!(state.resize(800.0, 0.0).is_err());
        assert_eq!(state.height, 600.0);
    }
}
