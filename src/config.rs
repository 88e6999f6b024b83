//! Round configuration
//!
//! Every size and speed is given at reference scale (an 800 px wide
//! playfield) and scaled to the real playfield when a round is built.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, Error};

/// How the brick grid is laid out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridSpec {
    /// Fixed cell size with padding and offsets (classic board)
    Fixed {
        rows: u32,
        cols: u32,
        width: f32,
        height: f32,
        padding: f32,
        offset_x: f32,
        offset_y: f32,
    },
    /// Square cells that exactly tile the playfield width; rows fill
    /// `fill_ratio` of the playfield height
    Fill { cols: u32, fill_ratio: f32 },
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec::Fixed {
            rows: 5,
            cols: 9,
            width: 80.0,
            height: 25.0,
            padding: 10.0,
            offset_x: 0.0,
            offset_y: 60.0,
        }
    }
}

/// How bricks get their palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Uniform random per brick, drawn from the round's seeded RNG
    #[default]
    Random,
    /// Palette entry chosen by row index
    ByRow,
}

/// Paddle tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub width: f32,
    pub min_width: f32,
    pub height: f32,
    /// Distance from the playfield bottom to the paddle top
    pub bottom_offset: f32,
    /// Keyboard speed in pixels per reference frame
    pub speed: f32,
    pub shrink_secs: f32,
    pub expand_secs: f32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: PADDLE_WIDTH,
            min_width: PADDLE_MIN_WIDTH,
            height: PADDLE_HEIGHT,
            bottom_offset: PADDLE_BOTTOM_OFFSET,
            speed: PADDLE_SPEED,
            shrink_secs: PADDLE_SHRINK_SECS,
            expand_secs: PADDLE_EXPAND_SECS,
        }
    }
}

/// Ball tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    /// Canonical launch vector in pixels per reference frame
    pub launch_dx: f32,
    pub launch_dy: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            launch_dx: BALL_LAUNCH_DX,
            launch_dy: BALL_LAUNCH_DY,
        }
    }
}

/// Penetration mechanic: a narrow paddle lets the ball plough through
/// more bricks before it turns around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenetrationConfig {
    /// Power at default (widest) paddle
    pub min_power: u32,
    /// Power at minimum (narrowest) paddle
    pub max_power: u32,
    /// Used when default width equals min width
    pub fallback_power: u32,
}

impl Default for PenetrationConfig {
    fn default() -> Self {
        Self {
            min_power: MIN_PENETRATION,
            max_power: MAX_PENETRATION,
            fallback_power: MIN_PENETRATION,
        }
    }
}

/// Complete round configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lives: u8,
    /// Points per destroyed brick
    pub brick_value: u32,
    pub grid: GridSpec,
    pub colors: ColorPolicy,
    pub paddle: PaddleConfig,
    pub ball: BallConfig,
    /// `None` reflects the ball off every brick it destroys
    pub penetration: Option<PenetrationConfig>,
    /// Paddle hit offset steers the ball and resets its speed
    pub angled_bounce: bool,
    pub max_bounce_angle_deg: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lives: START_LIVES,
            brick_value: BRICK_VALUE,
            grid: GridSpec::default(),
            colors: ColorPolicy::default(),
            paddle: PaddleConfig::default(),
            ball: BallConfig::default(),
            penetration: Some(PenetrationConfig::default()),
            angled_bounce: true,
            max_bounce_angle_deg: MAX_BOUNCE_ANGLE_DEG,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain Breakout: every brick reflects, paddle only flips the ball
    pub fn classic() -> Self {
        Self {
            colors: ColorPolicy::ByRow,
            penetration: None,
            angled_bounce: false,
            ..Self::default()
        }
    }

    /// Wall-to-wall square bricks over 70% of the field, a wide squeezable
    /// paddle and deep penetration
    pub fn dense() -> Self {
        Self {
            grid: GridSpec::Fill {
                cols: 30,
                fill_ratio: 0.7,
            },
            paddle: PaddleConfig {
                width: 300.0,
                min_width: 50.0,
                ..PaddleConfig::default()
            },
            penetration: Some(PenetrationConfig {
                min_power: 10,
                max_power: 100,
                fallback_power: 10,
            }),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        // Top of the paddle at reference scale; bricks must end above it
        let paddle_line = REFERENCE_HEIGHT - self.paddle.bottom_offset;
        match self.grid {
            GridSpec::Fixed {
                rows,
                cols,
                width,
                height,
                padding,
                offset_x,
                offset_y,
            } => {
                if rows == 0 || cols == 0 {
                    return Err(ConfigError::EmptyGrid);
                }
                check_brick_count(rows as u64 * cols as u64)?;
                if width <= 0.0 {
                    return Err(ConfigError::NonPositive("brick width"));
                }
                if height <= 0.0 {
                    return Err(ConfigError::NonPositive("brick height"));
                }
                if padding < 0.0 || offset_x < 0.0 || offset_y < 0.0 {
                    return Err(ConfigError::GridOverflow("negative padding or offset"));
                }
                let right = offset_x + cols as f32 * (width + padding) - padding;
                if right > REFERENCE_WIDTH {
                    return Err(ConfigError::GridOverflow("right edge past the field"));
                }
                let bottom = offset_y + rows as f32 * (height + padding) - padding;
                if bottom > paddle_line {
                    return Err(ConfigError::GridOverflow("bottom row below the paddle"));
                }
            }
            GridSpec::Fill { cols, fill_ratio } => {
                if cols == 0 {
                    return Err(ConfigError::EmptyGrid);
                }
                if !(fill_ratio > 0.0 && fill_ratio <= 1.0) {
                    return Err(ConfigError::FillRatio(fill_ratio));
                }
                check_brick_count(cols as u64)?;
                let cell = REFERENCE_WIDTH / cols as f32;
                let rows = ((REFERENCE_HEIGHT * fill_ratio) / cell).floor().max(1.0) as u64;
                check_brick_count(rows * cols as u64)?;
                if REFERENCE_HEIGHT * fill_ratio > paddle_line {
                    return Err(ConfigError::GridOverflow("bottom row below the paddle"));
                }
            }
        }

        let p = &self.paddle;
        if p.min_width <= 0.0 {
            return Err(ConfigError::NonPositive("paddle min width"));
        }
        if p.width > REFERENCE_WIDTH {
            return Err(ConfigError::PaddleTooWide(p.width));
        }
        if p.min_width > p.width {
            return Err(ConfigError::PaddleWidth {
                min: p.min_width,
                default: p.width,
            });
        }
        if p.height <= 0.0 {
            return Err(ConfigError::NonPositive("paddle height"));
        }
        if p.shrink_secs <= 0.0 {
            return Err(ConfigError::NonPositive("paddle shrink duration"));
        }
        if p.expand_secs <= 0.0 {
            return Err(ConfigError::NonPositive("paddle expand duration"));
        }
        if self.ball.radius <= 0.0 {
            return Err(ConfigError::NonPositive("ball radius"));
        }
        let (dx, dy) = (self.ball.launch_dx, self.ball.launch_dy);
        if !dx.is_finite() || !dy.is_finite() || dy >= 0.0 {
            return Err(ConfigError::Launch { dx, dy });
        }

        if let Some(pen) = &self.penetration {
            if pen.min_power > pen.max_power {
                return Err(ConfigError::PenetrationRange {
                    min: pen.min_power,
                    max: pen.max_power,
                });
            }
            if pen.min_power == 0 || pen.fallback_power == 0 {
                return Err(ConfigError::NonPositive("penetration power"));
            }
        }
        Ok(())
    }
}

fn check_brick_count(count: u64) -> Result<(), ConfigError> {
    if count > MAX_BRICKS as u64 {
        Err(ConfigError::TooManyBricks(count))
    } else {
        Ok(())
    }
}

/// Validate playfield dimensions handed in by a platform layer
pub fn validate_playfield(width: f32, height: f32) -> Result<(), ConfigError> {
    if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Playfield { width, height })
    }
}
