//! Ship model loading.
//!
//! The glTF ship is loaded through the asset server while the game sits in
//! `GameState::Loading`. If the file is missing or fails to load, a
//! procedural hull built from primitives is used instead so the game is
//! always playable without assets.

use bevy::{asset::LoadState, prelude::*};
use shared::{ship::ShipConfig, GameFolderPaths, SHIP_MODEL_PATH};

use crate::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelStatus {
    #[default]
    Loading,
    Loaded,
    Fallback,
}

#[derive(Resource, Debug, Default)]
pub struct ShipModel {
    pub scene: Option<Handle<Scene>>,
    pub status: ModelStatus,
}

/// Next status given where the load stands. `None` means nothing was
/// requested.
pub fn resolve_model_status(current: ModelStatus, load_state: Option<&LoadState>) -> ModelStatus {
    match (current, load_state) {
        (ModelStatus::Loading, None) => ModelStatus::Fallback,
        (ModelStatus::Loading, Some(LoadState::Loaded)) => ModelStatus::Loaded,
        (ModelStatus::Loading, Some(LoadState::Failed(_))) => ModelStatus::Fallback,
        (status, _) => status,
    }
}

pub fn start_ship_model_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    paths: Res<GameFolderPaths>,
) {
    let model_file = paths.assets_folder_path.join(SHIP_MODEL_PATH);
    if !model_file.exists() {
        warn!(
            "No ship model at {:?}, using the procedural hull",
            model_file
        );
        commands.insert_resource(ShipModel {
            scene: None,
            status: ModelStatus::Fallback,
        });
        return;
    }

    info!("Loading ship model from {:?}", model_file);
    commands.insert_resource(ShipModel {
        scene: Some(asset_server.load(GltfAssetLabel::Scene(0).from_asset(SHIP_MODEL_PATH))),
        status: ModelStatus::Loading,
    });
}

pub fn poll_ship_model(
    model: Option<ResMut<ShipModel>>,
    asset_server: Res<AssetServer>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut model) = model else {
        return;
    };

    let load_state = model
        .scene
        .as_ref()
        .map(|handle| asset_server.load_state(handle.id()));
    let status = resolve_model_status(model.status, load_state.as_ref());

    if let Some(LoadState::Failed(e)) = &load_state {
        error!("Ship model failed to load, using the procedural hull: {}", e);
    }
    if status != model.status {
        model.status = status;
    }
    if status != ModelStatus::Loading {
        next_state.set(GameState::Sailing);
    }
}

/// Spawn the visible part of the ship as children of the ship entity.
pub fn spawn_ship_visual(
    parent: &mut ChildSpawnerCommands,
    model: &ShipModel,
    config: &ShipConfig,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    match (&model.scene, model.status) {
        (Some(scene), ModelStatus::Loaded) => {
            parent.spawn((
                SceneRoot(scene.clone()),
                // Hull origin sits `draft` below the water line
                Transform::from_xyz(0.0, config.draft, 0.0),
            ));
        }
        _ => spawn_procedural_hull(parent, config.hull_size, meshes, materials),
    }
}

fn spawn_procedural_hull(
    parent: &mut ChildSpawnerCommands,
    hull_size: Vec3,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let wood = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.28, 0.15),
        perceptual_roughness: 0.8,
        ..default()
    });
    let trim = materials.add(StandardMaterial {
        base_color: Color::srgb(0.85, 0.82, 0.75),
        perceptual_roughness: 0.6,
        ..default()
    });
    let sail = materials.add(StandardMaterial {
        base_color: Color::srgb(0.95, 0.93, 0.88),
        perceptual_roughness: 0.9,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let (beam, height, length) = (hull_size.x, hull_size.y, hull_size.z);

    // Hull
    parent.spawn((
        Mesh3d(meshes.add(Cuboid::new(beam, height, length))),
        MeshMaterial3d(wood.clone()),
        Transform::default(),
    ));
    // Bow, a narrower block pushed forward
    parent.spawn((
        Mesh3d(meshes.add(Cuboid::new(beam * 0.6, height * 0.9, length * 0.2))),
        MeshMaterial3d(wood.clone()),
        Transform::from_xyz(0.0, 0.05, -length * 0.55),
    ));
    // Cabin
    parent.spawn((
        Mesh3d(meshes.add(Cuboid::new(beam * 0.7, height * 0.6, length * 0.25))),
        MeshMaterial3d(trim),
        Transform::from_xyz(0.0, height * 0.8, length * 0.25),
    ));
    // Mast
    let mast_height = length * 0.9;
    parent.spawn((
        Mesh3d(meshes.add(Cylinder::new(0.08, mast_height))),
        MeshMaterial3d(wood),
        Transform::from_xyz(0.0, height / 2.0 + mast_height / 2.0, -length * 0.1),
    ));
    // Sail
    parent.spawn((
        Mesh3d(meshes.add(Cuboid::new(0.02, mast_height * 0.7, length * 0.45))),
        MeshMaterial3d(sail),
        Transform::from_xyz(0.0, height / 2.0 + mast_height * 0.5, length * 0.1),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_status_transitions() {
        assert_eq!(
            resolve_model_status(ModelStatus::Loading, Some(&LoadState::Loading)),
            ModelStatus::Loading
        );
        assert_eq!(
            resolve_model_status(ModelStatus::Loading, Some(&LoadState::Loaded)),
            ModelStatus::Loaded
        );
        assert_eq!(
            resolve_model_status(ModelStatus::Loading, None),
            ModelStatus::Fallback
        );
        // Settled states stay put
        assert_eq!(
            resolve_model_status(ModelStatus::Fallback, Some(&LoadState::Loaded)),
            ModelStatus::Fallback
        );
        assert_eq!(
            resolve_model_status(ModelStatus::Loaded, Some(&LoadState::NotLoaded)),
            ModelStatus::Loaded
        );
    }

    #[test]
    fn test_missing_model_falls_back_and_starts_sailing() {
        use bevy::state::app::StatesPlugin;

        let folder = std::env::temp_dir().join(format!("seafarer-model-test-{}", std::process::id()));
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), StatesPlugin))
            .init_state::<GameState>()
            .insert_resource(GameFolderPaths {
                game_folder_path: folder.clone(),
                assets_folder_path: folder.join("assets"),
            })
            .add_systems(Startup, start_ship_model_load)
            .add_systems(Update, poll_ship_model.run_if(in_state(GameState::Loading)));

        app.update();
        app.update();

        assert_eq!(app.world().resource::<ShipModel>().status, ModelStatus::Fallback);
        assert_eq!(
            *app.world().resource::<State<GameState>>().get(),
            GameState::Sailing
        );
    }
}
