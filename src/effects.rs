//! Brick-destruction particles
//!
//! Purely cosmetic. The field has its own RNG so spawning particles never
//! shifts the round's brick colors.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::BrickColor;

/// Downward pull on debris, px/s² at reference scale
const GRAVITY: f32 = 420.0;

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub color: BrickColor,
    /// 1 at spawn, gone at 0
    pub life: f32,
    pub size: f32,
}

/// Live particles, oldest first
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    cap: usize,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(cap: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
            cap,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Change the cap, dropping the oldest particles if over it
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.evict(0);
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Spray `count` particles out of a destroyed brick
    pub fn burst(&mut self, center: Vec2, color: BrickColor, count: usize, scale: f32) {
        let count = count.min(self.cap);
        if count == 0 {
            return;
        }
        self.evict(count);

        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(60.0..220.0) * scale;
            let jitter = Vec2::new(
                self.rng.random_range(-6.0..6.0),
                self.rng.random_range(-4.0..4.0),
            ) * scale;
            self.particles.push(Particle {
                pos: center + jitter,
                vel: Vec2::from_angle(angle) * speed,
                color,
                life: 1.0,
                size: self.rng.random_range(2.0..5.0) * scale.max(0.25),
            });
        }
    }

    /// Age and move every particle; expired ones are removed
    pub fn update(&mut self, dt: f32, scale: f32) {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            p.vel.y += GRAVITY * scale * dt;
            p.vel *= 0.98;
            p.life -= dt * 1.5;
            p.size *= 0.995;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Make room for `incoming` new particles
    fn evict(&mut self, incoming: usize) {
        let keep = self.cap.saturating_sub(incoming);
        if self.particles.len() > keep {
            let excess = self.particles.len() - keep;
            self.particles.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_spawns_at_center() {
        let mut field = ParticleField::new(64, 1);
        field.burst(Vec2::new(100.0, 50.0), BrickColor(2), 10, 1.0);
        assert_eq!(field.len(), 10);
        for p in field.iter() {
            assert!((p.pos - Vec2::new(100.0, 50.0)).length() < 8.0);
            assert_eq!(p.life, 1.0);
            assert_eq!(p.color, BrickColor(2));
        }
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut field = ParticleField::new(12, 1);
        field.burst(Vec2::ZERO, BrickColor(0), 8, 1.0);
        field.burst(Vec2::ZERO, BrickColor(1), 8, 1.0);
        assert_eq!(field.len(), 12);
        assert_eq!(field.iter().filter(|p| p.color == BrickColor(0)).count(), 4);

        field.set_cap(5);
        assert_eq!(field.len(), 5);
        assert!(field.iter().all(|p| p.color == BrickColor(1)));
    }

    #[test]
    fn test_zero_cap_spawns_nothing() {
        let mut field = ParticleField::new(0, 1);
        field.burst(Vec2::ZERO, BrickColor(0), 8, 1.0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_particles_expire() {
        let mut field = ParticleField::new(32, 9);
        field.burst(Vec2::ZERO, BrickColor(0), 16, 1.0);
        field.update(0.3, 1.0);
        assert_eq!(field.len(), 16);
        assert!(field.iter().all(|p| p.life < 1.0));
        field.update(0.5, 1.0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_seeded_bursts_repeat() {
        let mut a = ParticleField::new(32, 5);
        let mut b = ParticleField::new(32, 5);
        a.burst(Vec2::ONE, BrickColor(3), 6, 1.0);
        b.burst(Vec2::ONE, BrickColor(3), 6, 1.0);
        assert!(a.iter().eq(b.iter()));
    }
}
