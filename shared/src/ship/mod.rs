//! Ship state, tuning and per-frame controls.

pub mod movement;

use bevy::math::{EulerRot, Quat, Vec3};
use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

pub use movement::*;

/// Frame rate the lerp rates in [`ShipConfig`] are expressed against.
/// A rate of 0.02 closes 2% of the gap per frame at this frame rate.
pub const REFERENCE_FPS: f32 = 60.0;

/// Tuning for ship handling. Loaded from `config.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ShipConfig {
    /// Top speed going forward (m/s)
    pub max_forward_speed: f32,
    /// Top speed in reverse (m/s, positive)
    pub max_reverse_speed: f32,
    /// Lerp rate used while gaining speed
    pub acceleration_rate: f32,
    /// Lerp rate used while losing speed or coasting
    pub deceleration_rate: f32,
    /// Turning radius at rest (m)
    pub min_turn_radius: f32,
    /// Turning radius at full forward speed (m)
    pub max_turn_radius: f32,
    /// Bank angle at full rudder and full speed (radians)
    pub max_roll: f32,
    /// Lerp rate for roll and pitch easing
    pub attitude_rate: f32,
    /// Bobbing amplitude on top of the wave height (m)
    pub bob_amplitude: f32,
    /// Bobbing frequency (Hz)
    pub bob_frequency: f32,
    /// How deep the hull origin sits below the water line (m)
    pub draft: f32,
    /// Upward velocity applied by a jump (m/s)
    pub jump_velocity: f32,
    /// Vertical acceleration while airborne (m/s², negative is down)
    pub gravity: f32,
    /// Fraction of impact speed returned as a bounce when landing hard
    pub landing_restitution: f32,
    /// Minimum downward impact speed that causes a bounce (m/s)
    pub bounce_threshold: f32,
    /// Fraction of speed kept (reversed) after hitting an obstacle
    pub collision_restitution: f32,
    /// Hull dimensions (beam, height, length)
    pub hull_size: Vec3,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_forward_speed: 18.0,
            max_reverse_speed: 5.0,
            acceleration_rate: 0.012,
            deceleration_rate: 0.02,
            min_turn_radius: 8.0,
            max_turn_radius: 30.0,
            max_roll: 0.22,
            attitude_rate: 0.06,
            bob_amplitude: 0.12,
            bob_frequency: 0.35,
            draft: 0.6,
            jump_velocity: 9.0,
            gravity: -20.0,
            landing_restitution: 0.35,
            bounce_threshold: 4.0,
            collision_restitution: 0.4,
            hull_size: Vec3::new(2.4, 1.6, 7.0),
        }
    }
}

/// Player intent for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipInput {
    /// -1.0 (full astern) to 1.0 (full ahead)
    pub throttle: f32,
    /// -1.0 (hard to port) to 1.0 (hard to starboard)
    pub rudder: f32,
    pub jump: bool,
}

/// Kinematic state of the ship.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ShipState {
    pub position: Vec3,
    /// Yaw in radians, 0 faces -Z
    pub heading: f32,
    /// Signed speed along the heading (m/s)
    pub speed: f32,
    pub roll: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub airborne: bool,
}

impl Default for ShipState {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

impl ShipState {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            roll: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            airborne: false,
        }
    }

    /// Unit vector the bow points along, flattened to the water plane.
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.heading) * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        Quat::from_rotation_y(self.heading) * Vec3::X
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.heading, self.pitch, self.roll)
    }

    /// World velocity including the vertical component.
    pub fn velocity(&self) -> Vec3 {
        self.forward() * self.speed + Vec3::Y * self.vertical_velocity
    }

    /// |speed| as a fraction of the forward top speed.
    pub fn speed_ratio(&self, config: &ShipConfig) -> f32 {
        if config.max_forward_speed <= 0.0 {
            return 0.0;
        }
        (self.speed.abs() / config.max_forward_speed).clamp(0.0, 1.0)
    }

    /// Point on the water line at the stern, where wake and bubbles start.
    pub fn stern(&self, config: &ShipConfig) -> Vec3 {
        self.position - self.forward() * (config.hull_size.z / 2.0)
    }
}
