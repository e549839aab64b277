//! Gerstner wave surface queries.
//!
//! Gerstner waves move surface particles in circles, which gives sharp crests
//! and wide troughs. Every consumer of the water height (ship bobbing,
//! floating bodies, the rendered water grid) samples this one surface so the
//! hull and the visible water never disagree.

use super::config::{WaveConfig, WaveParams};
use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use bevy::prelude::Resource;

/// Result of a water surface query at a single point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterSample {
    /// Surface height (Y coordinate)
    pub height: f32,
    /// Unit surface normal
    pub normal: Vec3,
    /// Horizontal orbital velocity of the surface water (x, z)
    pub flow_velocity: Vec2,
}

/// Precomputed constants for a single wave.
#[derive(Clone, Copy, Debug)]
struct WaveConstants {
    k: f32,
    omega: f32,
    amplitude: f32,
    steepness: f32,
    direction: Vec2,
}

impl WaveConstants {
    fn from_params(params: &WaveParams, amplitude_scale: f32) -> Self {
        Self {
            k: params.wave_number(),
            omega: params.frequency(),
            amplitude: params.amplitude() * amplitude_scale,
            steepness: params.steepness * amplitude_scale,
            direction: params.direction,
        }
    }

    #[inline]
    fn phase(&self, position: Vec2, time: f32) -> f32 {
        self.k * self.direction.dot(position) - self.omega * time
    }
}

/// The animated sea surface.
#[derive(Resource, Debug, Clone)]
pub struct WaterSurface {
    config: WaveConfig,
    constants: Vec<WaveConstants>,
}

impl Default for WaterSurface {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaterSurface {
    pub fn new(config: WaveConfig) -> Self {
        let constants = config
            .active_waves()
            .map(|w| WaveConstants::from_params(w, config.amplitude_scale))
            .collect();
        Self { config, constants }
    }

    /// Replace the wave configuration (e.g. when the sea state changes).
    pub fn set_config(&mut self, config: WaveConfig) {
        *self = Self::new(config);
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn base_level(&self) -> f32 {
        self.config.base_level
    }

    /// Water height at `position` (x, z).
    pub fn height(&self, position: Vec2, time: f32) -> f32 {
        self.constants
            .iter()
            .fold(self.config.base_level, |height, wave| {
                height + wave.amplitude * wave.phase(position, time).cos()
            })
    }

    /// Unit normal of the surface at `position`.
    pub fn normal(&self, position: Vec2, time: f32) -> Vec3 {
        let mut normal = Vec3::Y;

        for wave in &self.constants {
            let phase = wave.phase(position, time);
            let slope = wave.steepness * phase.sin();
            normal.x += wave.direction.x * slope;
            normal.z += wave.direction.y * slope;
        }

        normal.normalize_or(Vec3::Y)
    }

    /// Horizontal flow of the surface water, used to push floating objects.
    pub fn flow_velocity(&self, position: Vec2, time: f32) -> Vec2 {
        self.constants.iter().fold(Vec2::ZERO, |velocity, wave| {
            let phase = wave.phase(position, time);
            velocity + wave.direction * wave.amplitude * wave.omega * phase.cos()
        })
    }

    pub fn sample(&self, position: Vec2, time: f32) -> WaterSample {
        WaterSample {
            height: self.height(position, time),
            normal: self.normal(position, time),
            flow_velocity: self.flow_velocity(position, time),
        }
    }

    pub fn is_underwater(&self, position: Vec3, time: f32) -> bool {
        position.y < self.height(position.xz(), time)
    }

    /// Fraction (0.0 to 1.0) of a body of the given height, centred on
    /// `center`, that sits below the surface.
    pub fn submersion(&self, center: Vec3, height: f32, time: f32) -> f32 {
        if height <= 0.0 {
            return if self.is_underwater(center, time) { 1.0 } else { 0.0 };
        }

        let surface = self.height(center.xz(), time);
        let bottom = center.y - height / 2.0;
        ((surface - bottom) / height).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::WavePreset;

    #[test]
    fn test_still_water_is_flat() {
        let surface = WaterSurface::new(WavePreset::Still.to_config(2.5));
        for (x, z, t) in [(0.0, 0.0, 0.0), (13.0, -4.0, 7.5), (-100.0, 55.0, 120.0)] {
            assert_eq!(surface.height(Vec2::new(x, z), t), 2.5);
            assert_eq!(surface.normal(Vec2::new(x, z), t), Vec3::Y);
            assert_eq!(surface.flow_velocity(Vec2::new(x, z), t), Vec2::ZERO);
        }
    }

    #[test]
    fn test_height_stays_within_amplitude() {
        let config = WavePreset::Storm.to_config(0.0);
        let max = config.max_height();
        let surface = WaterSurface::new(config);
        for i in 0..200 {
            let p = Vec2::new(i as f32 * 1.7, i as f32 * -0.9);
            let h = surface.height(p, i as f32 * 0.13);
            assert!(h.abs() <= max + 1e-4, "height {h} exceeds {max}");
        }
    }

    #[test]
    fn test_height_varies_with_time() {
        let surface = WaterSurface::new(WavePreset::Ocean.to_config(0.0));
        let h1 = surface.height(Vec2::new(3.0, 4.0), 0.0);
        let h2 = surface.height(Vec2::new(3.0, 4.0), 1.3);
        assert!((h1 - h2).abs() > 1e-3);
    }

    #[test]
    fn test_normal_is_normalized() {
        let surface = WaterSurface::new(WavePreset::Storm.to_config(0.0));
        let normal = surface.normal(Vec2::new(5.0, 5.0), 1.0);
        assert!((normal.length() - 1.0).abs() < 1e-4);
        assert!(normal.y > 0.0);
    }

    #[test]
    fn test_submersion() {
        let surface = WaterSurface::new(WavePreset::Still.to_config(0.0));
        assert_eq!(surface.submersion(Vec3::new(0.0, 5.0, 0.0), 2.0, 0.0), 0.0);
        assert_eq!(surface.submersion(Vec3::new(0.0, -5.0, 0.0), 2.0, 0.0), 1.0);
        assert!((surface.submersion(Vec3::ZERO, 2.0, 0.0) - 0.5).abs() < 1e-6);
    }
}
