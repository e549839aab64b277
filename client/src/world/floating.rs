//! Buoys, crates and rocks scattered around the starting point.

use std::f32::consts::TAU;

use bevy::{math::Vec3Swizzles, prelude::*};
use bevy_rapier3d::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{
    physics::{collision_groups, FloatingBody, FloatingBodyBundle, PhysicsConfig},
    water::WaterSurface,
    GameConfig,
};

use crate::{ship::ShipControls, GameState};

/// Ring the floating bodies are scattered in, around the spawn point.
const FLOATING_RING: (f32, f32) = (18.0, 70.0);
const OBSTACLE_RING: (f32, f32) = (80.0, 130.0);
const OBSTACLE_COUNT: usize = 5;
/// Bodies farther than this from the ship, or this far under the surface,
/// are put back near the ship.
const LOST_DISTANCE: f32 = 220.0;
const LOST_DEPTH: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatingKind {
    Crate,
    Buoy,
}

/// Seeded scatter of `count` points in a ring around `center`. Points are
/// spread evenly in angle with some jitter so they don't bunch up.
pub fn scatter_in_ring(count: usize, center: Vec2, ring: (f32, f32), rng: &mut StdRng) -> Vec<Vec2> {
    let (inner, outer) = ring;
    (0..count)
        .map(|i| {
            let slice = TAU / count.max(1) as f32;
            let angle = i as f32 * slice + rng.gen_range(0.0_f32..slice * 0.8);
            let radius = rng.gen_range(inner..outer.max(inner + f32::EPSILON));
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

fn floating_kind(index: usize) -> FloatingKind {
    if index % 3 == 0 {
        FloatingKind::Buoy
    } else {
        FloatingKind::Crate
    }
}

pub fn spawn_floating_bodies(
    mut commands: Commands,
    config: Res<GameConfig>,
    physics_config: Res<PhysicsConfig>,
    water: Res<WaterSurface>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let spots = scatter_in_ring(config.floating_bodies, Vec2::ZERO, FLOATING_RING, &mut rng);

    let crate_size = 1.2;
    let crate_mesh = meshes.add(Cuboid::from_length(crate_size));
    let crate_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.6, 0.42, 0.22),
        perceptual_roughness: 0.9,
        ..default()
    });
    let (buoy_radius, buoy_height) = (0.6, 2.0);
    let buoy_mesh = meshes.add(Cylinder::new(buoy_radius, buoy_height));
    let buoy_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.85, 0.15, 0.1),
        perceptual_roughness: 0.5,
        ..default()
    });

    for (index, spot) in spots.into_iter().enumerate() {
        let y = water.height(spot, 0.0) + 1.0;
        let transform = Transform::from_xyz(spot.x, y, spot.y)
            .with_rotation(Quat::from_rotation_y(rng.gen_range(0.0_f32..TAU)));

        let (name, bundle, mesh, material) = match floating_kind(index) {
            FloatingKind::Crate => (
                "Crate",
                FloatingBodyBundle::crate_box(crate_size, physics_config.restitution),
                crate_mesh.clone(),
                crate_material.clone(),
            ),
            FloatingKind::Buoy => (
                "Buoy",
                FloatingBodyBundle::buoy(buoy_radius, buoy_height, physics_config.restitution),
                buoy_mesh.clone(),
                buoy_material.clone(),
            ),
        };

        commands.spawn((
            Name::new(format!("{name} {index}")),
            bundle,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            transform,
            StateScoped(GameState::Sailing),
        ));
    }

    info!("Spawned {} floating bodies", config.floating_bodies);
}

/// Fixed rocks the ship can run into.
pub fn spawn_obstacles(
    mut commands: Commands,
    config: Res<GameConfig>,
    water: Res<WaterSurface>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(2));
    let rock_mesh = meshes.add(Sphere::new(1.0));
    let rock_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.34, 0.32),
        perceptual_roughness: 1.0,
        ..default()
    });

    for (index, spot) in scatter_in_ring(OBSTACLE_COUNT, Vec2::ZERO, OBSTACLE_RING, &mut rng)
        .into_iter()
        .enumerate()
    {
        let radius = rng.gen_range(3.0_f32..7.0);
        commands.spawn((
            Name::new(format!("Rock {index}")),
            RigidBody::Fixed,
            // Rapier scales the collider by the transform, like the mesh
            Collider::ball(1.0),
            Restitution::coefficient(0.2),
            CollisionGroups::new(collision_groups::OBSTACLE, Group::ALL),
            Mesh3d(rock_mesh.clone()),
            MeshMaterial3d(rock_material.clone()),
            Transform::from_xyz(spot.x, water.base_level() - radius * 0.3, spot.y)
                .with_scale(Vec3::splat(radius)),
            StateScoped(GameState::Sailing),
        ));
    }
}

/// Puts floating bodies that sank or drifted out of sight back near the ship.
pub fn respawn_lost_bodies(
    ship_query: Query<&ShipControls>,
    mut bodies: Query<(&mut Transform, &mut Velocity), (With<FloatingBody>, Without<ShipControls>)>,
    water: Res<WaterSurface>,
    time: Res<Time>,
) {
    let Ok(controls) = ship_query.single() else {
        return;
    };
    let ship = controls.state.position;
    let t = time.elapsed_secs();

    for (mut transform, mut velocity) in bodies.iter_mut() {
        let position = transform.translation;
        let surface = water.height(position.xz(), t);
        let drifted = position.xz().distance(ship.xz()) > LOST_DISTANCE;
        let sunk = position.y < surface - LOST_DEPTH;
        if !drifted && !sunk {
            continue;
        }

        // Drop it ahead of the ship so it comes back into view
        let spot = ship.xz() + controls.state.forward().xz() * FLOATING_RING.1;
        transform.translation = Vec3::new(spot.x, water.height(spot, t) + 1.0, spot.y);
        *velocity = Velocity::zero();
        debug!("Floating body returned to {:?}", transform.translation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ship::ShipState;
    use shared::water::WavePreset;

    #[test]
    fn test_lost_bodies_come_back_ahead_of_the_ship() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(WaterSurface::new(WavePreset::Still.to_config(0.0)))
            .add_systems(Update, respawn_lost_bodies);
        app.world_mut()
            .spawn(ShipControls::new(ShipState::default()));

        let floating = FloatingBody {
            volume: 1.0,
            height: 1.0,
        };
        let mut spawn_body = |at: Vec3| {
            app.world_mut()
                .spawn((
                    Transform::from_translation(at),
                    Velocity::linear(Vec3::X * 4.0),
                    floating,
                ))
                .id()
        };
        let drifted = spawn_body(Vec3::new(LOST_DISTANCE + 10.0, 0.0, 0.0));
        let sunk = spawn_body(Vec3::new(10.0, -LOST_DEPTH - 5.0, 0.0));
        let nearby = spawn_body(Vec3::new(10.0, 0.0, 0.0));

        app.update();

        // Heading 0 faces -Z
        let ahead = Vec3::new(0.0, 1.0, -FLOATING_RING.1);
        for body in [drifted, sunk] {
            let transform = app.world().get::<Transform>(body).unwrap();
            assert!((transform.translation - ahead).length() < 1e-3);
            assert_eq!(app.world().get::<Velocity>(body).unwrap().linvel, Vec3::ZERO);
        }
        let transform = app.world().get::<Transform>(nearby).unwrap();
        assert_eq!(transform.translation, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(app.world().get::<Velocity>(nearby).unwrap().linvel, Vec3::X * 4.0);
    }

    #[test]
    fn test_scatter_stays_in_ring_and_is_seeded() {
        let center = Vec2::new(10.0, -5.0);
        let spots = scatter_in_ring(12, center, (18.0, 70.0), &mut StdRng::seed_from_u64(9));
        assert_eq!(spots.len(), 12);
        for spot in &spots {
            let distance = spot.distance(center);
            assert!((18.0 - 1e-3..70.0 + 1e-3).contains(&distance));
        }

        let again = scatter_in_ring(12, center, (18.0, 70.0), &mut StdRng::seed_from_u64(9));
        assert_eq!(spots, again);
    }

    #[test]
    fn test_mix_of_buoys_and_crates() {
        let kinds: Vec<_> = (0..6).map(floating_kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == FloatingKind::Buoy).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == FloatingKind::Crate).count(), 4);
    }
}
