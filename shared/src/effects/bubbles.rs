//! Bubble wash churned up behind the ship.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use bevy::reflect::Reflect;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BubbleConfig {
    /// Bubbles per second added at full speed
    pub rate_at_full_speed: f32,
    /// Bubbles per second while idling
    pub idle_rate: f32,
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    /// Radius of a fresh bubble (m)
    pub start_size: f32,
    /// Radius just before it pops (m)
    pub end_size: f32,
    /// Horizontal scatter around the emitter (m)
    pub spread: f32,
    /// Upward drift (m/s)
    pub rise_speed: f32,
    /// Fraction of horizontal velocity lost per second
    pub drift_drag: f32,
    /// Fraction of the ship's velocity a new bubble inherits
    pub inherit_velocity: f32,
    pub max_bubbles: usize,
    /// Bubbles emitted when the hull slams into the water
    pub splash_burst: usize,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            rate_at_full_speed: 90.0,
            idle_rate: 2.0,
            lifetime_min: 0.8,
            lifetime_max: 2.2,
            start_size: 0.18,
            end_size: 0.02,
            spread: 0.9,
            rise_speed: 0.25,
            drift_drag: 1.5,
            inherit_velocity: 0.3,
            max_bubbles: 400,
            splash_burst: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    pub lifetime: f32,
    pub start_size: f32,
    pub end_size: f32,
}

impl Bubble {
    /// Remaining fraction of life, 1.0 when fresh and 0.0 when expired.
    pub fn remaining(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    pub fn size(&self) -> f32 {
        self.end_size + (self.start_size - self.end_size) * self.remaining()
    }

    pub fn alpha(&self) -> f32 {
        self.remaining()
    }

    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }
}

#[derive(Resource, Debug, Clone)]
pub struct BubbleSystem {
    pub config: BubbleConfig,
    bubbles: Vec<Bubble>,
    /// Fractional emissions carried over between frames
    pending: f32,
    rng: StdRng,
}

impl BubbleSystem {
    pub fn new(config: BubbleConfig, seed: u64) -> Self {
        Self {
            bubbles: Vec::with_capacity(config.max_bubbles),
            config,
            pending: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.pending = 0.0;
    }

    pub fn emission_rate(&self, speed_ratio: f32) -> f32 {
        self.config.idle_rate + self.config.rate_at_full_speed * speed_ratio.clamp(0.0, 1.0)
    }

    /// Advance existing bubbles and emit new ones at `emitter`.
    pub fn update(&mut self, emitter: Vec3, ship_velocity: Vec3, speed_ratio: f32, delta: f32) {
        if delta <= 0.0 {
            return;
        }

        let drag = (1.0 - self.config.drift_drag * delta).max(0.0);
        let rise = self.config.rise_speed;
        for bubble in self.bubbles.iter_mut() {
            bubble.age += delta;
            bubble.velocity.x *= drag;
            bubble.velocity.z *= drag;
            bubble.velocity.y = rise;
            bubble.position += bubble.velocity * delta;
        }
        self.bubbles.retain(Bubble::is_alive);

        self.pending += self.emission_rate(speed_ratio) * delta;
        let count = self.pending.floor();
        self.pending -= count;

        let inherited = ship_velocity.with_y(0.0) * self.config.inherit_velocity;
        for _ in 0..count as usize {
            self.emit(emitter, inherited, 1.0);
        }
    }

    /// Emit a splash of `count` bubbles at `at`, e.g. when the hull lands.
    pub fn burst(&mut self, at: Vec3, count: usize) {
        for _ in 0..count {
            let kick = Vec3::new(
                self.rng.gen_range(-3.0_f32..=3.0),
                0.0,
                self.rng.gen_range(-3.0_f32..=3.0),
            );
            self.emit(at, kick, 2.5);
        }
    }

    fn emit(&mut self, at: Vec3, base_velocity: Vec3, spread_scale: f32) {
        if self.bubbles.len() >= self.config.max_bubbles {
            return;
        }

        let spread = self.config.spread * spread_scale;
        let offset = if spread > 0.0 {
            Vec3::new(
                self.rng.gen_range(-spread..=spread),
                0.0,
                self.rng.gen_range(-spread..=spread),
            )
        } else {
            Vec3::ZERO
        };
        let jitter = Vec3::new(
            self.rng.gen_range(-0.5_f32..=0.5),
            0.0,
            self.rng.gen_range(-0.5_f32..=0.5),
        );
        let (min, max) = (
            self.config.lifetime_min.min(self.config.lifetime_max),
            self.config.lifetime_min.max(self.config.lifetime_max),
        );
        let lifetime = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };
        let size_jitter = self.rng.gen_range(0.7_f32..=1.3);

        self.bubbles.push(Bubble {
            position: at + offset,
            velocity: base_velocity + jitter,
            age: 0.0,
            lifetime,
            start_size: self.config.start_size * size_jitter,
            end_size: self.config.end_size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> BubbleSystem {
        BubbleSystem::new(BubbleConfig::default(), 7)
    }

    #[test]
    fn test_emission_scales_with_speed() {
        let mut slow = system();
        let mut fast = system();
        for _ in 0..60 {
            slow.update(Vec3::ZERO, Vec3::ZERO, 0.0, 1.0 / 60.0);
            fast.update(Vec3::ZERO, Vec3::ZERO, 1.0, 1.0 / 60.0);
        }
        assert!(fast.len() > slow.len() * 10);
    }

    #[test]
    fn test_fractional_emission_accumulates() {
        let mut bubbles = BubbleSystem::new(
            BubbleConfig {
                idle_rate: 1.0,
                rate_at_full_speed: 0.0,
                lifetime_min: 10.0,
                lifetime_max: 10.0,
                ..Default::default()
            },
            1,
        );
        for _ in 0..9 {
            bubbles.update(Vec3::ZERO, Vec3::ZERO, 0.0, 0.1);
        }
        assert_eq!(bubbles.len(), 0);
        bubbles.update(Vec3::ZERO, Vec3::ZERO, 0.0, 0.11);
        assert_eq!(bubbles.len(), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut bubbles = BubbleSystem::new(
            BubbleConfig {
                max_bubbles: 25,
                ..Default::default()
            },
            3,
        );
        for _ in 0..100 {
            bubbles.update(Vec3::ZERO, Vec3::X, 1.0, 0.05);
            bubbles.burst(Vec3::ZERO, 10);
            assert!(bubbles.len() <= 25);
        }
    }

    #[test]
    fn test_bubbles_shrink_fade_and_expire() {
        let mut bubbles = system();
        bubbles.burst(Vec3::ZERO, 5);
        let fresh = bubbles.bubbles()[0];
        assert_eq!(fresh.alpha(), 1.0);
        assert!((fresh.size() - fresh.start_size).abs() < 1e-6);

        bubbles.update(Vec3::ZERO, Vec3::ZERO, 0.0, 0.5);
        let older = bubbles
            .bubbles()
            .iter()
            .find(|b| b.age > 0.0)
            .copied()
            .expect("burst bubbles outlive half a second");
        assert!(older.alpha() < 1.0);
        assert!(older.size() < older.start_size);
        assert!(older.position.y > 0.0);

        let max_lifetime = bubbles.config.lifetime_max;
        let mut quiet = BubbleSystem::new(
            BubbleConfig {
                idle_rate: 0.0,
                ..Default::default()
            },
            5,
        );
        quiet.burst(Vec3::ZERO, 20);
        quiet.update(Vec3::ZERO, Vec3::ZERO, 0.0, max_lifetime + 0.01);
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_seeded_systems_are_deterministic() {
        let mut a = system();
        let mut b = system();
        for _ in 0..30 {
            a.update(Vec3::ONE, Vec3::Z, 0.7, 1.0 / 30.0);
            b.update(Vec3::ONE, Vec3::Z, 0.7, 1.0 / 30.0);
        }
        assert_eq!(a.bubbles(), b.bubbles());
    }
}
