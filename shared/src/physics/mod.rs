//! Rapier physics integration for Seafarer.
//!
//! The ship is a kinematic body driven by the ship controls; buoys and crates
//! are dynamic bodies that float on the wave surface and bounce off the hull.
//! Rapier owns collision detection and integration, this module only sets up
//! the impostors and feeds buoyancy forces in.

pub mod buoyancy;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

pub use buoyancy::*;

/// Physics tuning. Part of `config.ron`.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration for dynamic bodies (m/s², negative is down)
    pub gravity: f32,
    /// Water density relative to the floating bodies' density
    pub water_density: f32,
    /// Linear drag applied to submerged bodies
    pub water_drag: f32,
    /// Angular drag applied to submerged bodies
    pub water_angular_drag: f32,
    /// How strongly the wave orbital flow pushes floating bodies
    pub wave_push: f32,
    /// Bounciness of buoys and crates
    pub restitution: f32,
    /// Draw collider outlines
    pub debug_render: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            water_density: 2.0,
            water_drag: 1.2,
            water_angular_drag: 0.8,
            wave_push: 1.5,
            restitution: 0.6,
            debug_render: false,
        }
    }
}

/// Collision groups used by the physics impostors.
pub mod collision_groups {
    use bevy_rapier3d::prelude::Group;

    pub const SHIP: Group = Group::GROUP_1;
    /// Buoys, crates and anything else that floats
    pub const FLOATING: Group = Group::GROUP_2;
    /// Static rocks and markers
    pub const OBSTACLE: Group = Group::GROUP_3;
}

/// Bundle for the player's ship. Kinematic, so the ship controls decide
/// where it goes and Rapier only reports what it touched.
#[derive(Bundle)]
pub struct ShipPhysicsBundle {
    pub body: RigidBody,
    pub collider: Collider,
    pub velocity: Velocity,
    pub active_events: ActiveEvents,
    pub active_collision_types: ActiveCollisionTypes,
    pub ccd: Ccd,
    pub restitution: Restitution,
    pub collision_groups: CollisionGroups,
}

impl ShipPhysicsBundle {
    /// `hull_size` is (beam, height, length).
    pub fn new(hull_size: Vec3) -> Self {
        Self {
            body: RigidBody::KinematicPositionBased,
            collider: Collider::cuboid(hull_size.x / 2.0, hull_size.y / 2.0, hull_size.z / 2.0),
            velocity: Velocity::zero(),
            active_events: ActiveEvents::COLLISION_EVENTS,
            // Kinematic-vs-fixed contacts are off by default, rocks need them
            active_collision_types: ActiveCollisionTypes::default()
                | ActiveCollisionTypes::KINEMATIC_STATIC,
            ccd: Ccd::enabled(),
            restitution: Restitution::coefficient(0.3),
            collision_groups: CollisionGroups::new(
                collision_groups::SHIP,
                collision_groups::FLOATING | collision_groups::OBSTACLE,
            ),
        }
    }
}

/// Bundle for a dynamic body that floats on the waves.
#[derive(Bundle)]
pub struct FloatingBodyBundle {
    pub body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub damping: Damping,
    pub restitution: Restitution,
    pub friction: Friction,
    pub collision_groups: CollisionGroups,
    pub floating: FloatingBody,
}

impl FloatingBodyBundle {
    fn new(collider: Collider, floating: FloatingBody, restitution: f32) -> Self {
        Self {
            body: RigidBody::Dynamic,
            collider,
            mass: ColliderMassProperties::Density(1.0),
            velocity: Velocity::zero(),
            external_force: ExternalForce::default(),
            damping: Damping {
                linear_damping: 0.1,
                angular_damping: 0.3,
            },
            restitution: Restitution::coefficient(restitution),
            friction: Friction::coefficient(0.4),
            collision_groups: CollisionGroups::new(collision_groups::FLOATING, Group::ALL),
            floating,
        }
    }

    /// A cubic crate with the given edge length.
    pub fn crate_box(size: f32, restitution: f32) -> Self {
        let half = size / 2.0;
        Self::new(
            Collider::cuboid(half, half, half),
            FloatingBody {
                volume: size.powi(3),
                height: size,
            },
            restitution,
        )
    }

    /// An upright cylindrical buoy.
    pub fn buoy(radius: f32, height: f32, restitution: f32) -> Self {
        Self::new(
            Collider::cylinder(height / 2.0, radius),
            FloatingBody {
                volume: std::f32::consts::PI * radius * radius * height,
                height,
            },
            restitution,
        )
    }
}

/// Sets up Rapier and the buoyancy systems.
pub struct SeafarerPhysicsPlugin;

impl Plugin for SeafarerPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            RapierPhysicsPlugin::<NoUserData>::default().with_default_system_setup(true),
        );

        if !app.world().contains_resource::<PhysicsConfig>() {
            app.insert_resource(PhysicsConfig::default());
        }
        app.register_type::<PhysicsConfig>()
            .add_systems(Startup, configure_rapier_context)
            .add_systems(FixedUpdate, apply_buoyancy);

        app.add_plugins(RapierDebugRenderPlugin::default().disabled())
            .add_systems(Update, (sync_physics_config, sync_debug_render));
    }
}

/// In bevy_rapier3d 0.30 `RapierConfiguration` is a component on the
/// context entity, so it is configured once the context exists.
fn configure_rapier_context(
    mut query: Query<&mut RapierConfiguration>,
    physics_config: Res<PhysicsConfig>,
) {
    for mut config in query.iter_mut() {
        config.gravity = Vec3::new(0.0, physics_config.gravity, 0.0);
        config.physics_pipeline_active = true;
        config.query_pipeline_active = true;
    }
    info!("Rapier configured with gravity {}", physics_config.gravity);
}

/// Pushes `PhysicsConfig` edits into Rapier and the floating bodies that
/// already exist.
pub fn sync_physics_config(
    physics_config: Res<PhysicsConfig>,
    mut contexts: Query<&mut RapierConfiguration>,
    mut bodies: Query<&mut Restitution, With<FloatingBody>>,
) {
    if !physics_config.is_changed() || physics_config.is_added() {
        return;
    }

    let gravity = Vec3::new(0.0, physics_config.gravity, 0.0);
    for mut config in contexts.iter_mut() {
        if config.gravity != gravity {
            config.gravity = gravity;
            debug!("Rapier gravity set to {}", physics_config.gravity);
        }
    }
    for mut restitution in bodies.iter_mut() {
        if restitution.coefficient != physics_config.restitution {
            restitution.coefficient = physics_config.restitution;
        }
    }
}

fn sync_debug_render(physics_config: Res<PhysicsConfig>, mut debug: ResMut<DebugRenderContext>) {
    if physics_config.is_changed() && debug.enabled != physics_config.debug_render {
        debug.enabled = physics_config.debug_render;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_edits_reach_rapier_and_bodies() {
        let mut app = App::new();
        app.insert_resource(PhysicsConfig::default())
            .add_systems(Update, sync_physics_config);
        let context = app.world_mut().spawn(RapierConfiguration::new(1.0)).id();
        let body = app
            .world_mut()
            .spawn((
                Restitution::coefficient(0.6),
                FloatingBody {
                    volume: 1.0,
                    height: 1.0,
                },
            ))
            .id();
        let rock = app.world_mut().spawn(Restitution::coefficient(0.2)).id();
        app.update();

        {
            let mut config = app.world_mut().resource_mut::<PhysicsConfig>();
            config.gravity = -3.0;
            config.restitution = 0.1;
        }
        app.update();

        let world = app.world();
        assert_eq!(
            world.get::<RapierConfiguration>(context).unwrap().gravity,
            Vec3::new(0.0, -3.0, 0.0)
        );
        assert_eq!(world.get::<Restitution>(body).unwrap().coefficient, 0.1);
        // Rocks aren't floating bodies and keep their own bounce
        assert_eq!(world.get::<Restitution>(rock).unwrap().coefficient, 0.2);
    }

    #[test]
    fn test_ship_bundle_is_kinematic_with_events() {
        let bundle = ShipPhysicsBundle::new(Vec3::new(2.0, 1.0, 6.0));
        assert!(matches!(bundle.body, RigidBody::KinematicPositionBased));
        assert!(bundle.active_events.contains(ActiveEvents::COLLISION_EVENTS));
        assert_eq!(bundle.collision_groups.memberships, collision_groups::SHIP);
        assert!(bundle
            .active_collision_types
            .contains(ActiveCollisionTypes::KINEMATIC_STATIC));
    }

    #[test]
    fn test_floating_bodies_are_dynamic_and_bouncy() {
        let crate_box = FloatingBodyBundle::crate_box(1.0, 0.6);
        assert!(matches!(crate_box.body, RigidBody::Dynamic));
        assert_eq!(crate_box.restitution.coefficient, 0.6);
        assert_eq!(crate_box.floating.volume, 1.0);

        let buoy = FloatingBodyBundle::buoy(0.5, 2.0, 0.8);
        assert!((buoy.floating.volume - std::f32::consts::PI * 0.5).abs() < 1e-5);
        assert_eq!(buoy.floating.height, 2.0);
    }
}
