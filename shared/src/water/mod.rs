//! Sea surface shared by the ship simulation, floating bodies and rendering.

pub mod config;
pub mod surface;

pub use config::{WaveConfig, WaveParams, WavePreset, MAX_WAVES};
pub use surface::{WaterSample, WaterSurface};
