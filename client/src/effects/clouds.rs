use std::collections::HashMap;

use bevy::{pbr::NotShadowCaster, prelude::*};
use shared::{
    effects::{Cloud, CloudEvent, CloudField},
    GameConfig,
};

use crate::{ship::ShipControls, GameState};

/// Peak alpha of a fully faded-in cloud.
const CLOUD_ALPHA: f32 = 0.85;

#[derive(Component)]
pub struct CloudVisual {
    pub id: u64,
}

struct CloudEntity {
    entity: Entity,
    material: Handle<StandardMaterial>,
}

/// Maps cloud ids from the simulation to their entities.
#[derive(Resource, Default)]
pub struct CloudEntities {
    entities: HashMap<u64, CloudEntity>,
    puff_mesh: Handle<Mesh>,
}

fn spawn_cloud(
    commands: &mut Commands,
    cloud: &Cloud,
    puff_mesh: &Handle<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> CloudEntity {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.0),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 1.0,
        reflectance: 0.1,
        ..default()
    });

    let entity = commands
        .spawn((
            Name::new(format!("Cloud {}", cloud.id)),
            CloudVisual { id: cloud.id },
            Transform::from_translation(cloud.position).with_scale(Vec3::splat(cloud.scale)),
            Visibility::default(),
            StateScoped(GameState::Sailing),
        ))
        .with_children(|parent| {
            for puff in &cloud.puffs {
                parent.spawn((
                    Mesh3d(puff_mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(puff.offset).with_scale(Vec3::splat(puff.radius)),
                    NotShadowCaster,
                ));
            }
        })
        .id();

    CloudEntity { entity, material }
}

fn apply_cloud_events(
    commands: &mut Commands,
    events: Vec<CloudEvent>,
    field: &CloudField,
    cloud_entities: &mut CloudEntities,
    materials: &mut Assets<StandardMaterial>,
) {
    for event in events {
        match event {
            CloudEvent::Spawned(id) => {
                let Some(cloud) = field.get(id) else {
                    continue;
                };
                let spawned = spawn_cloud(commands, cloud, &cloud_entities.puff_mesh, materials);
                cloud_entities.entities.insert(id, spawned);
            }
            CloudEvent::Despawned(id) => {
                if let Some(CloudEntity { entity, material }) = cloud_entities.entities.remove(&id) {
                    commands.entity(entity).despawn();
                    materials.remove(&material);
                }
            }
        }
    }
}

pub fn setup_clouds(
    mut commands: Commands,
    config: Res<GameConfig>,
    ship_query: Query<&ShipControls>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let center = ship_query
        .single()
        .map(|controls| controls.state.position)
        .unwrap_or(Vec3::ZERO);

    // Offset the seed so clouds don't mirror the bubble scatter
    let mut field = CloudField::new(config.clouds.clone(), config.seed.wrapping_add(1));
    let mut cloud_entities = CloudEntities {
        entities: HashMap::new(),
        puff_mesh: meshes.add(Sphere::new(1.0).mesh().ico(3).unwrap_or_else(|e| {
            warn!("Falling back to a UV sphere for clouds: {}", e);
            Sphere::new(1.0).mesh().uv(16, 12)
        })),
    };

    let events = field.populate(center);
    apply_cloud_events(
        &mut commands,
        events,
        &field,
        &mut cloud_entities,
        &mut materials,
    );
    info!("Sky populated with {} clouds", field.len());

    commands.insert_resource(field);
    commands.insert_resource(cloud_entities);
}

pub fn update_clouds_system(
    mut commands: Commands,
    ship_query: Query<&ShipControls>,
    field: Option<ResMut<CloudField>>,
    cloud_entities: Option<ResMut<CloudEntities>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    time: Res<Time>,
) {
    let (Some(mut field), Some(mut cloud_entities)) = (field, cloud_entities) else {
        return;
    };
    let Ok(controls) = ship_query.single() else {
        return;
    };

    let events = field.update(controls.state.position, time.delta_secs());
    apply_cloud_events(
        &mut commands,
        events,
        &field,
        &mut cloud_entities,
        &mut materials,
    );
}

pub fn render_clouds_system(
    field: Option<Res<CloudField>>,
    cloud_entities: Option<Res<CloudEntities>>,
    mut clouds: Query<(&CloudVisual, &mut Transform)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (Some(field), Some(cloud_entities)) = (field, cloud_entities) else {
        return;
    };

    for (visual, mut transform) in clouds.iter_mut() {
        let Some(cloud) = field.get(visual.id) else {
            continue;
        };
        transform.translation = cloud.position;

        let Some(entry) = cloud_entities.entities.get(&visual.id) else {
            continue;
        };
        let alpha = cloud.opacity() * CLOUD_ALPHA;
        // Only touch the material while fading so it isn't re-uploaded every frame
        let fading = materials
            .get(&entry.material)
            .is_some_and(|material| (material.base_color.alpha() - alpha).abs() > 1e-3);
        if fading {
            if let Some(material) = materials.get_mut(&entry.material) {
                material.base_color.set_alpha(alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::effects::CloudConfig;

    #[test]
    fn test_cloud_events_keep_entities_in_sync() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(AssetPlugin::default())
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>();

        let config = CloudConfig {
            max_clouds: 5,
            ..default()
        };
        let mut field = CloudField::new(config, 3);
        let mut cloud_entities = CloudEntities::default();
        let events = field.populate(Vec3::ZERO);
        let spawned = events.len();

        let world = app.world_mut();
        world.resource_scope(|world, mut materials: Mut<Assets<StandardMaterial>>| {
            let mut queue = bevy::ecs::world::CommandQueue::default();
            let mut commands = Commands::new(&mut queue, world);
            apply_cloud_events(&mut commands, events, &field, &mut cloud_entities, &mut materials);
            queue.apply(world);
        });
        assert_eq!(cloud_entities.entities.len(), spawned);
        assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), spawned);

        // Drag the centre far away so every cloud is retired
        let events = field.update(Vec3::new(10_000.0, 0.0, 10_000.0), 0.016);
        let world = app.world_mut();
        world.resource_scope(|world, mut materials: Mut<Assets<StandardMaterial>>| {
            let mut queue = bevy::ecs::world::CommandQueue::default();
            let mut commands = Commands::new(&mut queue, world);
            apply_cloud_events(&mut commands, events, &field, &mut cloud_entities, &mut materials);
            queue.apply(world);
        });
        assert_eq!(cloud_entities.entities.len(), field.len());

        let mut visuals = app.world_mut().query::<&CloudVisual>();
        assert_eq!(visuals.iter(app.world()).count(), field.len());
    }
}
