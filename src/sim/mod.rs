//! Round simulation
//!
//! All gameplay logic lives here. Nothing in this module draws, reads
//! devices or touches the platform:
//! - Real elapsed time in, substepped in reference frames
//! - Seeded RNG only (brick colors)
//! - Row-major brick order, so a seed and an input sequence replay exactly

pub mod collision;
pub mod layout;
pub mod state;
pub mod tick;

pub use collision::{WallHit, ball_lost, paddle_contact, penetration_power, resolve_walls};
pub use layout::{BrickLayout, build_bricks};
pub use state::{
    Ball, Brick, BrickColor, GameEvent, GamePhase, GameState, PALETTE_LEN, Paddle, Penetration,
};
pub use tick::{TickInput, tick};
