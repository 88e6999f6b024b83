//! Platform glue
//!
//! Browser-specific code lives in `web` (wasm32 only). What is left here
//! runs everywhere: backdrop selection and the headless demo loop used by
//! the native binary.

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use crate::consts::REFERENCE_FRAME_DT;
use crate::game::{Game, Hud};
use crate::renderer::VertexBatch;

/// Backdrop images shipped next to the page; one is picked per session
pub const DEFAULT_BACKDROPS: &[&str] = &[
    "assets/backdrop-1.jpg",
    "assets/backdrop-2.jpg",
    "assets/backdrop-3.jpg",
];

/// Pick one backdrop URL at random. `None` for an empty list.
pub fn pick_backdrop<'a>(urls: &[&'a str], seed: u64) -> Option<&'a str> {
    let mut rng = Pcg32::seed_from_u64(seed);
    urls.choose(&mut rng).copied()
}

/// Let the demo player run a round at 60 FPS until it ends or
/// `max_frames` have passed. Every frame is drawn into an offscreen
/// vertex batch. Returns the final HUD.
pub fn run_headless(game: &mut Game, max_frames: u64) -> Hud {
    game.set_autopilot(true);
    let (width, height) = (game.state().width, game.state().height);
    let mut batch = VertexBatch::new(width, height);
    let mut frames = 0;
    let mut peak_vertices = 0;
    while frames < max_frames && !game.state().phase().is_terminal() {
        game.update(REFERENCE_FRAME_DT);
        game.render(&mut batch);
        peak_vertices = peak_vertices.max(batch.vertices().len());
        frames += 1;
    }
    log::debug!(
        "Peak frame size {} vertices ({} bytes)",
        peak_vertices,
        peak_vertices * std::mem::size_of::<crate::renderer::Vertex>()
    );
    let hud = game.hud();
    log::info!(
        "Headless round ended after {} frames: {:?}, score {}, {} lives, {}/{} bricks left",
        frames,
        hud.phase,
        hud.score,
        hud.lives,
        hud.remaining,
        hud.total
    );
    hud
}
