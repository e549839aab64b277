//! Wave configuration shared by the ship simulation, floating bodies and the
//! water mesh renderer.

use bevy::math::Vec2;
use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};
use std::{f32::consts::PI, fmt, str::FromStr};

/// Maximum number of waves summed at a surface point.
pub const MAX_WAVES: usize = 4;

/// Configuration for a single Gerstner wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct WaveParams {
    /// Wave direction (normalized 2D vector, x/z)
    pub direction: Vec2,
    /// Wave steepness (0.0 = sine wave, 1.0 = sharp crest)
    pub steepness: f32,
    /// Wavelength in world units
    pub wavelength: f32,
    /// Phase speed multiplier
    pub speed: f32,
}

impl WaveParams {
    pub fn new(direction: Vec2, steepness: f32, wavelength: f32, speed: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            steepness: steepness.clamp(0.0, 1.0),
            wavelength: wavelength.max(0.1),
            speed,
        }
    }

    /// Wave number (k = 2π / wavelength)
    #[inline(always)]
    pub fn wave_number(&self) -> f32 {
        2.0 * PI / self.wavelength
    }

    /// Angular frequency (ω = k * speed)
    #[inline(always)]
    pub fn frequency(&self) -> f32 {
        self.wave_number() * self.speed
    }

    /// Crest height above the base level, before the global amplitude scale.
    #[inline(always)]
    pub fn amplitude(&self) -> f32 {
        self.steepness / self.wave_number()
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        Self::new(Vec2::X, 0.3, 12.0, 1.0)
    }
}

/// Complete wave configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
pub struct WaveConfig {
    /// Active waves, at most [`MAX_WAVES`]
    pub waves: Vec<WaveParams>,
    /// Base water level (Y coordinate)
    pub base_level: f32,
    /// Global amplitude multiplier
    pub amplitude_scale: f32,
}

impl WaveConfig {
    /// Create a flat configuration with no waves.
    pub fn new(base_level: f32) -> Self {
        Self {
            waves: Vec::with_capacity(MAX_WAVES),
            base_level,
            amplitude_scale: 1.0,
        }
    }

    /// Add a wave. Returns false if the wave budget is already used up.
    pub fn add_wave(&mut self, params: WaveParams) -> bool {
        if self.waves.len() < MAX_WAVES {
            self.waves.push(params);
            true
        } else {
            false
        }
    }

    pub fn active_waves(&self) -> impl Iterator<Item = &WaveParams> {
        self.waves.iter().take(MAX_WAVES)
    }

    /// Upper bound on how far the surface can rise above `base_level`.
    pub fn max_height(&self) -> f32 {
        self.active_waves()
            .map(|w| w.amplitude() * self.amplitude_scale)
            .sum()
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        WavePreset::default().to_config(0.0)
    }
}

/// Preset wave configurations for different sea states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Reflect)]
pub enum WavePreset {
    /// Completely still water
    Still,
    /// Barely rippled water
    Calm,
    /// Gentle chop
    Lake,
    /// Open sea swell
    #[default]
    Ocean,
    /// Large storm waves
    Storm,
}

impl WavePreset {
    pub const ALL: [WavePreset; 5] = [
        WavePreset::Still,
        WavePreset::Calm,
        WavePreset::Lake,
        WavePreset::Ocean,
        WavePreset::Storm,
    ];

    /// Create a [`WaveConfig`] from this preset.
    pub fn to_config(self, base_level: f32) -> WaveConfig {
        let mut config = WaveConfig::new(base_level);

        match self {
            WavePreset::Still => {}
            WavePreset::Calm => {
                config.amplitude_scale = 0.3;
                config.add_wave(WaveParams::new(Vec2::new(1.0, 0.2), 0.2, 18.0, 0.5));
            }
            WavePreset::Lake => {
                config.amplitude_scale = 0.5;
                config.add_wave(WaveParams::new(Vec2::new(1.0, 0.0), 0.3, 12.0, 0.8));
                config.add_wave(WaveParams::new(Vec2::new(0.3, 1.0), 0.2, 7.0, 1.0));
            }
            WavePreset::Ocean => {
                config.add_wave(WaveParams::new(Vec2::new(1.0, 0.3), 0.25, 32.0, 1.2));
                config.add_wave(WaveParams::new(Vec2::new(-0.7, 1.0), 0.2, 18.0, 1.4));
                config.add_wave(WaveParams::new(Vec2::new(0.5, -1.0), 0.15, 9.0, 1.8));
                config.add_wave(WaveParams::new(Vec2::new(-1.0, -0.5), 0.1, 4.5, 2.2));
            }
            WavePreset::Storm => {
                config.amplitude_scale = 1.8;
                config.add_wave(WaveParams::new(Vec2::new(1.0, 0.2), 0.35, 48.0, 1.6));
                config.add_wave(WaveParams::new(Vec2::new(-0.5, 1.0), 0.3, 28.0, 2.0));
                config.add_wave(WaveParams::new(Vec2::new(0.7, -0.7), 0.25, 14.0, 2.4));
                config.add_wave(WaveParams::new(Vec2::new(-1.0, -0.3), 0.2, 7.0, 2.8));
            }
        }

        config
    }

    pub fn name(self) -> &'static str {
        match self {
            WavePreset::Still => "still",
            WavePreset::Calm => "calm",
            WavePreset::Lake => "lake",
            WavePreset::Ocean => "ocean",
            WavePreset::Storm => "storm",
        }
    }
}

impl fmt::Display for WavePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WavePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WavePreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown wave preset '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_wave_counts() {
        assert_eq!(WavePreset::Still.to_config(0.0).waves.len(), 0);
        assert_eq!(WavePreset::Calm.to_config(0.0).waves.len(), 1);
        assert_eq!(WavePreset::Lake.to_config(0.0).waves.len(), 2);
        assert_eq!(WavePreset::Ocean.to_config(0.0).waves.len(), 4);
        assert_eq!(WavePreset::Storm.to_config(0.0).waves.len(), 4);
    }

    #[test]
    fn test_add_wave_respects_budget() {
        let mut config = WavePreset::Ocean.to_config(0.0);
        assert!(!config.add_wave(WaveParams::default()));
        assert_eq!(config.waves.len(), MAX_WAVES);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("Storm".parse::<WavePreset>(), Ok(WavePreset::Storm));
        assert_eq!("calm".parse::<WavePreset>(), Ok(WavePreset::Calm));
        assert!("tsunami".parse::<WavePreset>().is_err());
    }

    #[test]
    fn test_storm_is_rougher_than_calm() {
        let calm = WavePreset::Calm.to_config(0.0).max_height();
        let storm = WavePreset::Storm.to_config(0.0).max_height();
        assert!(storm > calm);
        assert_eq!(WavePreset::Still.to_config(0.0).max_height(), 0.0);
    }
}
