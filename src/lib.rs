//! Blockbreak - a Breakout-style brick breaker
//!
//! Core modules:
//! - `sim`: Round simulation (entities, collisions, frame step)
//! - `input`: Keyboard/pointer/touch intent record read once per frame
//! - `renderer`: Draw-call surface abstraction and vertex tessellation
//! - `effects`: Cosmetic particle bursts (never touch simulation state)
//! - `game`: Frame driver tying input, step, effects and render together
//! - `platform`: Browser driver (wasm32) and the headless demo loop

pub mod config;
pub mod effects;
pub mod error;
pub mod game;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{ColorPolicy, GameConfig, GridSpec, PenetrationConfig};
pub use error::{ConfigError, Error};
pub use game::Game;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Reference frame duration: velocities are expressed in pixels per 1/60 s
    pub const REFERENCE_FRAME_DT: f32 = 1.0 / 60.0;
    /// Longest frame we simulate; anything slower is treated as this (tab switch, debugger)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame, keeps a fast ball from tunneling through bricks
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield width all configured sizes are expressed against
    pub const REFERENCE_WIDTH: f32 = 800.0;
    pub const REFERENCE_HEIGHT: f32 = 600.0;

    /// Responsive playfield sizing
    pub const MAX_PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_SIDE_MARGIN: f32 = 40.0;
    pub const PLAYFIELD_HEIGHT_RATIO: f32 = 0.7;
    pub const MIN_PLAYFIELD_HEIGHT: f32 = 400.0;

    /// Round defaults
    pub const START_LIVES: u8 = 3;
    pub const BRICK_VALUE: u32 = 10;

    /// Paddle defaults (reference scale)
    pub const PADDLE_WIDTH: f32 = 150.0;
    pub const PADDLE_MIN_WIDTH: f32 = 50.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    pub const PADDLE_BOTTOM_OFFSET: f32 = 30.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    /// Seconds to squeeze from default to minimum width while pressed
    pub const PADDLE_SHRINK_SECS: f32 = 1.5;
    /// Seconds to grow back from minimum to default width once released
    pub const PADDLE_EXPAND_SECS: f32 = 0.5;

    /// Ball defaults (reference scale)
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_LAUNCH_DX: f32 = 4.0;
    pub const BALL_LAUNCH_DY: f32 = -4.0;

    /// Steepest paddle deflection, measured from vertical
    pub const MAX_BOUNCE_ANGLE_DEG: f32 = 60.0;

    /// Penetration power bounds (bricks destroyed before a forced reflection)
    pub const MIN_PENETRATION: u32 = 1;
    pub const MAX_PENETRATION: u32 = 5;

    /// Upper bound on bricks in one grid
    pub const MAX_BRICKS: usize = 10_000;
}

/// Fit the playfield into a window: capped at 800 wide with a side margin,
/// 70% of the window tall but never shorter than 400.
pub fn fit_playfield(window_width: f32, window_height: f32) -> (f32, f32) {
    use consts::*;

    let width = if window_width < MAX_PLAYFIELD_WIDTH + PLAYFIELD_SIDE_MARGIN {
        (window_width - PLAYFIELD_SIDE_MARGIN).max(1.0)
    } else {
        MAX_PLAYFIELD_WIDTH
    };
    let height = (window_height * PLAYFIELD_HEIGHT_RATIO).max(MIN_PLAYFIELD_HEIGHT);
    (width, height)
}
