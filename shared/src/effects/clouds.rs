//! Clouds drifting across the sky around the ship.

use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use bevy::prelude::Resource;
use bevy::reflect::Reflect;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Spawn intervals below this (including zero or negative ones from the
/// config) are treated as this.
const MIN_SPAWN_INTERVAL: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct CloudConfig {
    pub max_clouds: usize,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    /// Distance from the ship at which new clouds appear (m)
    pub spawn_radius: f32,
    /// Clouds farther than this from the ship are retired (m)
    pub despawn_radius: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub puffs_min: usize,
    pub puffs_max: usize,
    /// Wind velocity over the sea (x, z in m/s)
    pub wind: Vec2,
    /// Seconds a new cloud takes to become fully opaque
    pub fade_time: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            max_clouds: 24,
            spawn_interval: 2.5,
            spawn_radius: 260.0,
            despawn_radius: 320.0,
            altitude_min: 60.0,
            altitude_max: 110.0,
            scale_min: 8.0,
            scale_max: 20.0,
            puffs_min: 3,
            puffs_max: 7,
            wind: Vec2::new(4.0, 1.5),
            fade_time: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPuff {
    /// Offset from the cloud centre, in units of the cloud scale
    pub offset: Vec3,
    /// Radius in units of the cloud scale
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub id: u64,
    pub position: Vec3,
    pub scale: f32,
    pub puffs: Vec<CloudPuff>,
    pub age: f32,
    fade_time: f32,
}

impl Cloud {
    pub fn opacity(&self) -> f32 {
        if self.fade_time <= 0.0 {
            return 1.0;
        }
        (self.age / self.fade_time).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudEvent {
    Spawned(u64),
    Despawned(u64),
}

#[derive(Resource, Debug, Clone)]
pub struct CloudField {
    pub config: CloudConfig,
    clouds: Vec<Cloud>,
    spawn_timer: f32,
    next_id: u64,
    rng: StdRng,
}

impl CloudField {
    pub fn new(config: CloudConfig, seed: u64) -> Self {
        Self {
            clouds: Vec::with_capacity(config.max_clouds),
            config,
            spawn_timer: 0.0,
            next_id: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn get(&self, id: u64) -> Option<&Cloud> {
        self.clouds.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    /// Scatter half the cloud budget over the sky around `center`. These
    /// start fully opaque.
    pub fn populate(&mut self, center: Vec3) -> Vec<CloudEvent> {
        let target = self.config.max_clouds / 2;
        let mut events = Vec::with_capacity(target);
        while self.clouds.len() < target {
            let angle = self.rng.gen_range(0.0_f32..std::f32::consts::TAU);
            let distance = self.config.spawn_radius * self.rng.gen_range(0.0_f32..1.0).sqrt();
            let at = center.xz() + Vec2::from_angle(angle) * distance;
            let id = self.spawn_at(at);
            if let Some(cloud) = self.clouds.last_mut() {
                cloud.age = cloud.fade_time;
            }
            events.push(CloudEvent::Spawned(id));
        }
        events
    }

    /// Drift, age, spawn and retire clouds. `center` is the ship position.
    pub fn update(&mut self, center: Vec3, delta: f32) -> Vec<CloudEvent> {
        let mut events = Vec::new();
        if delta <= 0.0 {
            return events;
        }

        let drift = Vec3::new(self.config.wind.x, 0.0, self.config.wind.y) * delta;
        for cloud in self.clouds.iter_mut() {
            cloud.position += drift;
            cloud.age += delta;
        }

        let despawn_sq = self.config.despawn_radius.powi(2);
        self.clouds.retain(|cloud| {
            let keep = cloud.position.xz().distance_squared(center.xz()) <= despawn_sq;
            if !keep {
                events.push(CloudEvent::Despawned(cloud.id));
            }
            keep
        });

        let interval = self.config.spawn_interval.max(MIN_SPAWN_INTERVAL);
        self.spawn_timer += delta;
        let due = (self.spawn_timer / interval).floor();
        self.spawn_timer -= due * interval;
        let free = self.config.max_clouds.saturating_sub(self.clouds.len());
        for _ in 0..(due as usize).min(free) {
            let at = self.upwind_spawn_point(center);
            events.push(CloudEvent::Spawned(self.spawn_at(at)));
        }

        events
    }

    /// A point on the upwind edge of the spawn circle, so new clouds drift
    /// across the ship's sky.
    fn upwind_spawn_point(&mut self, center: Vec3) -> Vec2 {
        let upwind = -self.config.wind.normalize_or(Vec2::X);
        let across = upwind.perp();
        let spread = self.rng.gen_range(-1.0_f32..=1.0) * self.config.spawn_radius * 0.6;
        center.xz() + upwind * self.config.spawn_radius + across * spread
    }

    fn spawn_at(&mut self, at: Vec2) -> u64 {
        let config = &self.config;
        let altitude = sample_range(&mut self.rng, config.altitude_min, config.altitude_max);
        let scale = sample_range(&mut self.rng, config.scale_min, config.scale_max);
        let puff_count = if config.puffs_max > config.puffs_min {
            self.rng.gen_range(config.puffs_min..=config.puffs_max)
        } else {
            config.puffs_min
        }
        .max(1);

        let mut puffs = Vec::with_capacity(puff_count);
        for i in 0..puff_count {
            // Spread puffs along the cloud's long axis, flatter than they are wide
            let along = if puff_count > 1 {
                i as f32 / (puff_count - 1) as f32 * 2.0 - 1.0
            } else {
                0.0
            };
            puffs.push(CloudPuff {
                offset: Vec3::new(
                    along * 1.2 + self.rng.gen_range(-0.2_f32..=0.2),
                    self.rng.gen_range(-0.1_f32..=0.25),
                    self.rng.gen_range(-0.4_f32..=0.4),
                ),
                radius: self.rng.gen_range(0.5_f32..=0.9) * (1.0 - along.abs() * 0.35),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.clouds.push(Cloud {
            id,
            position: Vec3::new(at.x, altitude, at.y),
            scale,
            puffs,
            age: 0.0,
            fade_time: config.fade_time,
        });
        log::debug!("Spawned cloud {id} at {at:?}");
        id
    }
}

fn sample_range(rng: &mut StdRng, a: f32, b: f32) -> f32 {
    let (min, max) = (a.min(b), a.max(b));
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> CloudField {
        CloudField::new(CloudConfig::default(), 42)
    }

    #[test]
    fn test_populate_fills_half_the_sky() {
        let mut field = field();
        let events = field.populate(Vec3::ZERO);
        assert_eq!(field.len(), field.config.max_clouds / 2);
        assert_eq!(events.len(), field.len());
        for cloud in field.clouds() {
            assert!(cloud.position.xz().length() <= field.config.spawn_radius + 1e-3);
            assert!((field.config.altitude_min..=field.config.altitude_max).contains(&cloud.position.y));
            assert_eq!(cloud.opacity(), 1.0);
            assert!(!cloud.puffs.is_empty());
        }
    }

    #[test]
    fn test_spawns_on_timer_upwind() {
        let mut field = field();
        let interval = field.config.spawn_interval;
        assert!(field.update(Vec3::ZERO, interval * 0.5).is_empty());

        let events = field.update(Vec3::ZERO, interval * 0.6);
        assert_eq!(events.len(), 1);
        let CloudEvent::Spawned(id) = events[0] else {
            panic!("expected a spawn, got {:?}", events[0]);
        };
        let cloud = field.get(id).expect("spawned cloud is tracked");
        // Wind blows toward +x, so new clouds come from -x
        assert!(cloud.position.x < 0.0);
        assert_eq!(cloud.opacity(), 0.0);
    }

    #[test]
    fn test_clouds_drift_with_wind_and_fade_in() {
        let mut field = field();
        field.update(Vec3::ZERO, field.config.spawn_interval);
        let before = field.clouds()[0].position;
        field.update(Vec3::ZERO, 1.0);
        let cloud = &field.clouds()[0];
        let wind = field.config.wind;
        assert!((cloud.position - before - Vec3::new(wind.x, 0.0, wind.y)).length() < 1e-3);
        assert!(cloud.opacity() > 0.0 && cloud.opacity() < 1.0);
    }

    #[test]
    fn test_distant_clouds_are_retired() {
        let mut field = field();
        field.populate(Vec3::ZERO);
        let ids: Vec<u64> = field.clouds().iter().map(|c| c.id).collect();

        // Sail far away: every existing cloud falls outside the despawn radius
        let events = field.update(Vec3::new(10_000.0, 0.0, 0.0), 0.1);
        for id in ids {
            assert!(events.contains(&CloudEvent::Despawned(id)));
            assert!(field.get(id).is_none());
        }
    }

    #[test]
    fn test_respects_cloud_budget() {
        let mut field = CloudField::new(
            CloudConfig {
                max_clouds: 3,
                spawn_interval: 0.1,
                wind: Vec2::ZERO,
                ..Default::default()
            },
            9,
        );
        for _ in 0..100 {
            field.update(Vec3::ZERO, 0.35);
            assert!(field.len() <= 3);
        }
        assert_eq!(field.len(), 3);
    }

    #[test]
    fn test_zero_spawn_interval_still_returns() {
        let mut field = CloudField::new(
            CloudConfig {
                max_clouds: 5,
                spawn_interval: 0.0,
                ..Default::default()
            },
            3,
        );
        let events = field.update(Vec3::ZERO, 0.016);
        assert!(events.len() <= 5);

        // A long frame spawns at most the free budget
        let events = field.update(Vec3::ZERO, 60.0);
        assert!(events.len() <= 5);
        assert_eq!(field.len(), 5);

        field.config.spawn_interval = -1.0;
        field.update(Vec3::ZERO, 0.016);
        assert_eq!(field.len(), 5);
    }
}
