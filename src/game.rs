//! Frame driver
//!
//! Owns one round plus everything around it (input, particles, backdrop
//! status, settings) and runs step, effects and render once per frame.
//! Platform code only forwards events and timestamps.

use serde::Serialize;

use crate::config::GameConfig;
use crate::consts::{MAX_FRAME_DT, REFERENCE_FRAME_DT};
use crate::effects::ParticleField;
use crate::error::{ConfigError, Error};
use crate::input::{InputState, autopilot};
use crate::renderer::{Backdrop, Surface, render};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, tick};

/// Observer snapshot for a HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u32,
    pub lives: u8,
    pub phase: GamePhase,
    pub remaining: usize,
    pub total: usize,
}

pub struct Game {
    state: GameState,
    input: InputState,
    particles: ParticleField,
    settings: Settings,
    backdrop: Backdrop,
    /// Timestamp of the previous frame, ms
    last_time: Option<f64>,
    /// Simulated seconds, drives render-only animation
    clock: f64,
    autopilot: bool,
}

impl Game {
    pub fn new(
        config: GameConfig,
        settings: Settings,
        width: f32,
        height: f32,
        seed: u64,
    ) -> Result<Self, Error> {
        let state = GameState::new(config, width, height, seed)?;
        let particles = ParticleField::new(settings.max_particles(), seed ^ 0x5eed);
        log::info!(
            "Game initialized: {}x{} playfield, {} bricks, seed {}",
            width,
            height,
            state.total_bricks(),
            seed
        );
        Ok(Self {
            state,
            input: InputState::new(),
            particles,
            settings,
            backdrop: Backdrop::Disabled,
            last_time: None,
            clock: 0.0,
            autopilot: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.particles.set_cap(settings.max_particles());
        self.settings = settings;
    }

    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
    }

    pub fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = backdrop;
    }

    /// Let the demo player drive the paddle
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Advance by the time since the previous animation-frame timestamp.
    /// The very first frame counts as one reference frame.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => REFERENCE_FRAME_DT,
        };
        self.last_time = Some(now_ms);
        self.update(dt);
    }

    /// Step the round by `dt` seconds and play out its events
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        let manual = self.input.frame_input();
        let input = if self.autopilot {
            let mut auto = autopilot(&self.state);
            auto.restart = manual.restart;
            auto
        } else {
            manual
        };

        tick(&mut self.state, &input, dt);

        for event in self.state.drain_events() {
            self.handle_event(event);
        }
        self.particles.update(dt, self.state.scale);
        self.clock += dt as f64;
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::BrickDestroyed { center, color, .. } => {
                self.particles
                    .burst(center, color, self.settings.burst_size(), self.state.scale);
            }
            GameEvent::Restarted => self.particles.clear(),
            GameEvent::LifeLost { lives_left } => {
                log::debug!("Ball lost, {} lives left", lives_left);
            }
            _ => {}
        }
    }

    pub fn render(&self, surface: &mut impl Surface) {
        render(
            &self.state,
            &self.particles,
            &self.backdrop,
            &self.settings,
            surface,
            self.clock,
        );
    }

    /// Refit to a new playfield size between frames
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        self.state.resize(width, height)
    }

    /// Deal a fresh round immediately
    pub fn restart(&mut self) {
        self.state.restart();
        self.state.drain_events();
        self.input.clear_one_shots();
        self.particles.clear();
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.state.score(),
            lives: self.state.lives(),
            phase: self.state.phase(),
            remaining: self.state.remaining_bricks(),
            total: self.state.total_bricks(),
        }
    }
}
