//! The visible sea.
//!
//! A square grid of vertices follows the ship and is displaced on the CPU
//! every frame from the same `WaterSurface` the hull and floating bodies
//! sample, so what you see is what the physics feels. The grid origin snaps
//! to whole cells to keep vertices from swimming as the ship moves.

use bevy::{
    math::Vec3Swizzles,
    pbr::NotShadowCaster,
    prelude::*,
    render::{
        mesh::{Indices, PrimitiveTopology},
        view::NoFrustumCulling,
    },
};
use shared::{water::WaterSurface, GameConfig};

use crate::{ship::ShipControls, GameState};

#[derive(Component, Debug, Clone, Copy)]
pub struct WaterGrid {
    pub size: f32,
    /// Quads per side
    pub resolution: u32,
}

impl WaterGrid {
    pub fn new(size: f32, resolution: u32) -> Self {
        Self {
            size: size.max(1.0),
            resolution: resolution.max(1),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.size / self.resolution as f32
    }

    pub fn vertices_per_side(&self) -> u32 {
        self.resolution + 1
    }

    /// Local (x, z) of every vertex, row by row.
    pub fn local_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        let half = self.size / 2.0;
        let cell = self.cell_size();
        let side = self.vertices_per_side();
        (0..side).flat_map(move |row| {
            (0..side).map(move |col| Vec2::new(col as f32 * cell - half, row as f32 * cell - half))
        })
    }

    /// Where the grid centre goes for a ship at `position`.
    pub fn snapped_origin(&self, position: Vec2) -> Vec2 {
        let cell = self.cell_size();
        (position / cell).round() * cell
    }
}

/// Flat grid mesh data: positions, uvs and indices.
pub fn build_grid(grid: &WaterGrid) -> (Vec<[f32; 3]>, Vec<[f32; 2]>, Vec<u32>) {
    let side = grid.vertices_per_side();
    let positions: Vec<[f32; 3]> = grid
        .local_positions()
        .map(|p| [p.x, 0.0, p.y])
        .collect();
    let uvs = (0..side)
        .flat_map(|row| {
            (0..side).map(move |col| [col as f32 / grid.resolution as f32, row as f32 / grid.resolution as f32])
        })
        .collect();

    let mut indices = Vec::with_capacity((grid.resolution * grid.resolution * 6) as usize);
    for row in 0..grid.resolution {
        for col in 0..grid.resolution {
            let top_left = row * side + col;
            let top_right = top_left + 1;
            let bottom_left = top_left + side;
            let bottom_right = bottom_left + 1;
            // Counter-clockwise seen from above
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    (positions, uvs, indices)
}

/// Displaced local positions and normals for a grid centred at `origin`.
pub fn displace_grid(
    grid: &WaterGrid,
    origin: Vec2,
    water: &WaterSurface,
    time: f32,
) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    grid.local_positions()
        .map(|local| {
            let world = origin + local;
            (
                [local.x, water.height(world, time), local.y],
                water.normal(world, time).to_array(),
            )
        })
        .unzip()
}

pub fn spawn_water(
    mut commands: Commands,
    config: Res<GameConfig>,
    water: Res<WaterSurface>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let grid = WaterGrid::new(config.water.grid_size, config.water.grid_resolution);
    let (positions, uvs, indices) = build_grid(&grid);
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, Default::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));

    let [r, g, b, a] = config.water.color;
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(r, g, b, a),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.08,
        metallic: 0.0,
        // Strong specular so the sky and sun read on the surface
        reflectance: 0.9,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Name::new("Sea"),
        grid,
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::from_xyz(0.0, 0.0, 0.0),
        // Bounds are computed from the flat grid, waves poke out of them
        NoFrustumCulling,
        NotShadowCaster,
        StateScoped(GameState::Sailing),
    ));

    info!(
        "Sea grid {}m, {} quads per side, max wave height {:.2}m",
        grid.size,
        grid.resolution,
        water.config().max_height()
    );
}

pub fn update_water_mesh(
    ship_query: Query<&ShipControls>,
    mut water_query: Query<(&WaterGrid, &Mesh3d, &mut Transform), Without<ShipControls>>,
    mut meshes: ResMut<Assets<Mesh>>,
    water: Res<WaterSurface>,
    time: Res<Time>,
) {
    let Ok((grid, mesh_handle, mut transform)) = water_query.single_mut() else {
        return;
    };
    let center = ship_query
        .single()
        .map(|controls| controls.state.position.xz())
        .unwrap_or(Vec2::ZERO);

    let origin = grid.snapped_origin(center);
    transform.translation = Vec3::new(origin.x, 0.0, origin.y);

    let (positions, normals) = displace_grid(grid, origin, &water, time.elapsed_secs());
    if let Some(mesh) = meshes.get_mut(&mesh_handle.0) {
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    }
}
