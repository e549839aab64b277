use bevy::{
    math::Vec3Swizzles,
    pbr::NotShadowCaster,
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        view::NoFrustumCulling,
    },
};
use shared::{
    effects::{RibbonGeometry, WaterTrail},
    water::WaterSurface,
    GameConfig,
};

use crate::{ship::ShipControls, GameState};

/// The single ribbon mesh drawn behind the ship.
#[derive(Component)]
pub struct TrailMesh;

/// Converts ribbon data into a Bevy mesh.
pub fn ribbon_mesh(geometry: RibbonGeometry) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, Default::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, geometry.positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, geometry.normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, geometry.uvs);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, geometry.colors);
    mesh.insert_indices(Indices::U32(geometry.indices));
    mesh
}

/// A degenerate quad, so the mesh has valid attributes before the ship moves.
fn placeholder_ribbon() -> RibbonGeometry {
    RibbonGeometry {
        positions: vec![[0.0; 3]; 4],
        normals: vec![[0.0, 1.0, 0.0]; 4],
        colors: vec![[0.0; 4]; 4],
        uvs: vec![[0.0; 2]; 4],
        indices: vec![0, 2, 1, 1, 2, 3],
    }
}

pub fn spawn_trail_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Name::new("Wake trail"),
        TrailMesh,
        Mesh3d(meshes.add(ribbon_mesh(placeholder_ribbon()))),
        MeshMaterial3d(material),
        Transform::default(),
        Visibility::Hidden,
        // Vertices are in world space, the entity never moves
        NoFrustumCulling,
        NotShadowCaster,
        StateScoped(GameState::Sailing),
    ));
}

pub fn update_trail_system(
    ship_query: Query<&ShipControls>,
    mut trail: ResMut<WaterTrail>,
    config: Res<GameConfig>,
    water: Res<WaterSurface>,
    time: Res<Time>,
) {
    let Ok(controls) = ship_query.single() else {
        return;
    };
    let state = &controls.state;

    let stern = state.stern(&config.ship);
    let anchor = stern.with_y(water.height(stern.xz(), time.elapsed_secs()));
    // No wake while the hull is out of the water
    let speed_ratio = if state.airborne {
        0.0
    } else {
        state.speed_ratio(&config.ship)
    };

    trail.update(anchor, speed_ratio, time.delta_secs());
}

pub fn render_trail_system(
    trail: Res<WaterTrail>,
    water: Res<WaterSurface>,
    time: Res<Time>,
    mut trail_query: Query<(&Mesh3d, &mut Visibility), With<TrailMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let Ok((mesh_handle, mut visibility)) = trail_query.single_mut() else {
        return;
    };

    let mut geometry = trail.build_ribbon();
    if geometry.is_empty() {
        *visibility = Visibility::Hidden;
        return;
    }

    // Keep the ribbon riding the waves as they pass under it
    let t = time.elapsed_secs();
    for position in geometry.positions.iter_mut() {
        position[1] = water.height(Vec2::new(position[0], position[2]), t) + trail.config.lift;
    }

    if let Some(mesh) = meshes.get_mut(&mesh_handle.0) {
        *mesh = ribbon_mesh(geometry);
    }
    *visibility = Visibility::Visible;
}
