//! `config.ron`: every tunable in one file, each section optional.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use bevy::prelude::*;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::{BubbleConfig, CloudConfig, TrailConfig};
use crate::physics::PhysicsConfig;
use crate::ship::ShipConfig;
use crate::water::WavePreset;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(ron::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(ron::Error),
}

/// Sea state and the extent of the rendered water grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct WaterConfig {
    pub preset: WavePreset,
    pub base_level: f32,
    /// Side length of the water grid that follows the ship (m)
    pub grid_size: f32,
    /// Quads per side of the water grid
    pub grid_resolution: u32,
    pub color: [f32; 4],
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            preset: WavePreset::Ocean,
            base_level: 0.0,
            grid_size: 400.0,
            grid_resolution: 128,
            color: [0.05, 0.25, 0.4, 0.92],
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct GameConfig {
    pub ship: ShipConfig,
    pub trail: TrailConfig,
    pub bubbles: BubbleConfig,
    pub clouds: CloudConfig,
    pub water: WaterConfig,
    pub physics: PhysicsConfig,
    /// Number of buoys and crates scattered around the start
    pub floating_bodies: usize,
    /// Seed for every random effect
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ship: ShipConfig::default(),
            trail: TrailConfig::default(),
            bubbles: BubbleConfig::default(),
            clouds: CloudConfig::default(),
            water: WaterConfig::default(),
            physics: PhysicsConfig::default(),
            floating_bodies: 12,
            seed: 0x5EA_FA2E,
        }
    }
}

pub fn parse_config(content: &str) -> Result<GameConfig, ConfigError> {
    ron::from_str(content).map_err(ConfigError::Parse)
}

pub fn write_config(config: &GameConfig, path: &Path) -> Result<(), ConfigError> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(4)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(false);

    let serialized =
        ron::ser::to_string_pretty(config, pretty_config).map_err(ConfigError::Serialize)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

/// Read the config at `path`. A missing file is created with the defaults.
pub fn load_or_create_config(path: &Path) -> Result<GameConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let config = GameConfig::default();
            write_config(&config, path)?;
            info!("Wrote default config to {:?}", path);
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("seafarer-config-test-{}-{name}", std::process::id()))
            .join("config.ron")
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("(seed: 7, ship: (max_forward_speed: 30.0))").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.ship.max_forward_speed, 30.0);
        assert_eq!(config.ship.max_reverse_speed, ShipConfig::default().max_reverse_speed);
        assert_eq!(config.trail, TrailConfig::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(parse_config("(seed: \"nope\")"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_created_and_reloaded() {
        let path = temp_path("create");
        let _ = fs::remove_file(&path);

        let created = load_or_create_config(&path).unwrap();
        assert_eq!(created, GameConfig::default());
        assert!(path.exists());

        let reloaded = load_or_create_config(&path).unwrap();
        assert_eq!(reloaded, created);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
