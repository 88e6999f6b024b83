//! Presentation settings
//!
//! Only affects how a round looks, never how it plays.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }

    /// Live particle cap for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }

    /// Particles spawned per destroyed brick
    pub fn burst_size(&self) -> usize {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 10,
            QualityPreset::High => 18,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(format!("unknown quality preset `{other}`")),
        }
    }
}

/// Display preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Brick-destruction particle bursts
    pub particles: bool,
    /// Draw the backdrop image behind the bricks
    pub background_image: bool,
    /// No flashing (min-width paddle flash is held steady)
    pub reduced_motion: bool,
    /// Solid dark background and outlined paddle
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            background_image: true,
            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Switch preset; Low also drops the backdrop image
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.background_image = false;
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the squeezed paddle should blink
    pub fn effective_paddle_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Particle cap after the particles toggle
    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }

    pub fn burst_size(&self) -> usize {
        if self.particles {
            self.quality.burst_size()
        } else {
            0
        }
    }
}
