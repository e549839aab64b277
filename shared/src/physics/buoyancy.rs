//! Buoyancy and water drag for floating rigid bodies.

use bevy::math::Vec3Swizzles;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, Velocity};

use super::PhysicsConfig;
use crate::water::WaterSurface;

/// Marks a dynamic body that should float on the water surface.
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FloatingBody {
    /// Displaced volume when fully submerged (m³)
    pub volume: f32,
    /// Vertical extent used to estimate how much of the body is submerged
    pub height: f32,
}

/// Upward force on a body with `submersion` (0.0 to 1.0) of its `volume`
/// under water.
pub fn buoyancy_force(submersion: f32, volume: f32, config: &PhysicsConfig) -> f32 {
    config.water_density * volume * submersion.clamp(0.0, 1.0) * -config.gravity
}

/// Drag opposing the body's motion relative to the surface flow.
pub fn water_drag_force(
    velocity: Vec3,
    flow: Vec2,
    submersion: f32,
    volume: f32,
    config: &PhysicsConfig,
) -> Vec3 {
    let flow = Vec3::new(flow.x, 0.0, flow.y) * config.wave_push;
    (flow - velocity) * config.water_drag * submersion.clamp(0.0, 1.0) * volume
}

pub fn apply_buoyancy(
    mut bodies: Query<(&Transform, &FloatingBody, &Velocity, &mut ExternalForce)>,
    water: Res<WaterSurface>,
    config: Res<PhysicsConfig>,
    // Virtual time, so bodies sample the same sea clock as the rendered waves
    time: Res<Time<Virtual>>,
) {
    let t = time.elapsed_secs();

    for (transform, body, velocity, mut external) in bodies.iter_mut() {
        let position = transform.translation;
        let submersion = water.submersion(position, body.height, t);

        if submersion <= 0.0 {
            external.force = Vec3::ZERO;
            external.torque = Vec3::ZERO;
            continue;
        }

        let flow = water.flow_velocity(position.xz(), t);
        external.force = Vec3::Y * buoyancy_force(submersion, body.volume, &config)
            + water_drag_force(velocity.linvel, flow, submersion, body.volume, &config);
        external.torque = -velocity.angvel * config.water_angular_drag * submersion * body.volume;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::WavePreset;

    #[test]
    fn test_buoyancy_scales_with_submersion() {
        let config = PhysicsConfig::default();
        assert_eq!(buoyancy_force(0.0, 1.0, &config), 0.0);
        let half = buoyancy_force(0.5, 1.0, &config);
        let full = buoyancy_force(1.0, 1.0, &config);
        assert!(half > 0.0);
        assert!((full - 2.0 * half).abs() < 1e-4);
        assert_eq!(buoyancy_force(3.0, 1.0, &config), full);
    }

    #[test]
    fn test_half_submerged_unit_body_is_in_equilibrium() {
        // Unit density bodies in water of relative density 2 float half under
        let config = PhysicsConfig::default();
        let weight = 1.0 * -config.gravity;
        assert!((buoyancy_force(0.5, 1.0, &config) - weight).abs() < 1e-4);
    }

    #[test]
    fn test_drag_opposes_motion() {
        let config = PhysicsConfig::default();
        let drag = water_drag_force(Vec3::new(2.0, -1.0, 0.0), Vec2::ZERO, 1.0, 1.0, &config);
        assert!(drag.x < 0.0);
        assert!(drag.y > 0.0);
        assert_eq!(water_drag_force(Vec3::X, Vec2::ZERO, 0.0, 1.0, &config), Vec3::ZERO);
    }

    #[test]
    fn test_apply_buoyancy_system() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(WaterSurface::new(WavePreset::Still.to_config(0.0)))
            .insert_resource(PhysicsConfig::default())
            .add_systems(Update, apply_buoyancy);

        let floating = FloatingBody {
            volume: 1.0,
            height: 1.0,
        };
        let sunk = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, -0.25, 0.0),
                floating,
                Velocity::zero(),
                ExternalForce::default(),
            ))
            .id();
        let flying = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 10.0, 0.0),
                floating,
                Velocity::zero(),
                ExternalForce {
                    force: Vec3::ONE,
                    torque: Vec3::ONE,
                },
            ))
            .id();

        app.update();

        let force = app.world().get::<ExternalForce>(sunk).unwrap().force;
        assert!(force.y > 0.0);
        let force = app.world().get::<ExternalForce>(flying).unwrap();
        assert_eq!(force.force, Vec3::ZERO);
        assert_eq!(force.torque, Vec3::ZERO);
    }
}
