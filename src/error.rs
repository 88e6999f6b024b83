//! Error types

use thiserror::Error;

/// Rejected game configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("playfield must be positive, got {width}x{height}")]
    Playfield { width: f32, height: f32 },
    #[error("brick grid needs at least one row and one column")]
    EmptyGrid,
    #[error("brick grid spills past the playfield ({0})")]
    GridOverflow(&'static str),
    #[error("brick grid has {0} bricks, more than the limit of {max}", max = crate::consts::MAX_BRICKS)]
    TooManyBricks(u64),
    #[error("fill ratio must be in (0, 1], got {0}")]
    FillRatio(f32),
    #[error("a round needs at least one life")]
    NoLives,
    #[error("paddle min width {min} exceeds default width {default}")]
    PaddleWidth { min: f32, default: f32 },
    #[error("paddle width {0} is wider than the playfield")]
    PaddleTooWide(f32),
    #[error("ball must launch upward, got ({dx}, {dy})")]
    Launch { dx: f32, dy: f32 },
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("penetration min power {min} exceeds max power {max}")]
    PenetrationRange { min: u32, max: u32 },
}

/// Anything that stops a game from starting
#[derive(Debug, Error)]
pub enum Error {
    #[error("no canvas element with id `{0}`")]
    MissingCanvas(String),
    #[error("canvas has no 2d drawing context")]
    MissingContext,
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}
