use bevy::{math::Vec3Swizzles, pbr::NotShadowCaster, prelude::*};
use shared::{effects::BubbleSystem, water::WaterSurface, GameConfig};

use crate::{
    ship::{ShipControls, ShipLandedEvent},
    GameState,
};

/// Materials are shared per alpha step instead of one per bubble.
const ALPHA_STEPS: usize = 8;

/// One slot of the bubble pool, drawing `BubbleSystem::bubbles()[index]`.
#[derive(Component)]
pub struct BubbleSprite {
    pub index: usize,
}

/// The sprite pool and the materials shared by every sprite in it.
#[derive(Resource)]
pub struct BubblePool {
    root: Entity,
    mesh: Handle<Mesh>,
    steps: Vec<Handle<StandardMaterial>>,
    size: usize,
}

impl BubblePool {
    fn for_alpha(&self, alpha: f32) -> Option<&Handle<StandardMaterial>> {
        self.steps.get(alpha_step(alpha))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Adds sprites under the pool root until it can draw `capacity` bubbles.
    fn grow_to(&mut self, capacity: usize, commands: &mut Commands) {
        if capacity <= self.size {
            return;
        }
        let mesh = self.mesh.clone();
        let material = self.steps.first().cloned().unwrap_or_default();
        let start = self.size;
        commands.entity(self.root).with_children(|parent| {
            for index in start..capacity {
                parent.spawn((
                    BubbleSprite { index },
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::default(),
                    Visibility::Hidden,
                    NotShadowCaster,
                ));
            }
        });
        self.size = capacity;
    }
}

pub fn alpha_step(alpha: f32) -> usize {
    (alpha.clamp(0.0, 1.0) * (ALPHA_STEPS - 1) as f32).round() as usize
}

pub fn spawn_bubble_pool(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(1.0).mesh().uv(10, 6));
    let steps: Vec<_> = (0..ALPHA_STEPS)
        .map(|step| {
            let alpha = step as f32 / (ALPHA_STEPS - 1) as f32;
            materials.add(StandardMaterial {
                base_color: Color::srgba(0.92, 0.97, 1.0, alpha * 0.8),
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: 0.2,
                reflectance: 0.6,
                ..default()
            })
        })
        .collect();

    let root = commands
        .spawn((
            Name::new("Bubble wash"),
            Transform::default(),
            Visibility::default(),
            StateScoped(GameState::Sailing),
        ))
        .id();

    let mut pool = BubblePool {
        root,
        mesh,
        steps,
        size: 0,
    };
    pool.grow_to(config.bubbles.max_bubbles, &mut commands);
    commands.insert_resource(pool);
}

/// Keeps the sprite pool as large as the bubble budget after config edits.
pub fn grow_bubble_pool(
    mut commands: Commands,
    bubbles: Res<BubbleSystem>,
    pool: Option<ResMut<BubblePool>>,
) {
    let Some(mut pool) = pool else {
        return;
    };
    if bubbles.config.max_bubbles > pool.size {
        debug!(
            "Growing bubble pool from {} to {}",
            pool.size, bubbles.config.max_bubbles
        );
        pool.grow_to(bubbles.config.max_bubbles, &mut commands);
    }
}

pub fn update_bubbles_system(
    ship_query: Query<&ShipControls>,
    mut bubbles: ResMut<BubbleSystem>,
    mut landed_events: EventReader<ShipLandedEvent>,
    config: Res<GameConfig>,
    water: Res<WaterSurface>,
    time: Res<Time>,
) {
    let Ok(controls) = ship_query.single() else {
        return;
    };
    let state = &controls.state;

    let stern = state.stern(&config.ship);
    let emitter = stern.with_y(water.height(stern.xz(), time.elapsed_secs()));
    let speed_ratio = if state.airborne {
        0.0
    } else {
        state.speed_ratio(&config.ship)
    };
    bubbles.update(emitter, state.velocity(), speed_ratio, time.delta_secs());

    for event in landed_events.read() {
        debug!("Splash at {:?}, impact {:.1}", event.position, event.impact_speed);
        let splash = event.position.with_y(water.height(event.position.xz(), time.elapsed_secs()));
        bubbles.burst(splash, config.bubbles.splash_burst);
    }
}

pub fn render_bubbles_system(
    bubbles: Res<BubbleSystem>,
    pool: Option<Res<BubblePool>>,
    water: Res<WaterSurface>,
    time: Res<Time>,
    mut sprites: Query<(
        &BubbleSprite,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let Some(pool) = pool else {
        return;
    };
    let t = time.elapsed_secs();

    for (sprite, mut transform, mut visibility, mut material) in sprites.iter_mut() {
        let Some(bubble) = bubbles.bubbles().get(sprite.index) else {
            if *visibility != Visibility::Hidden {
                *visibility = Visibility::Hidden;
            }
            continue;
        };

        // Bubbles rise to the surface and sit there until they pop
        let surface = water.height(bubble.position.xz(), t);
        transform.translation = bubble.position.with_y(bubble.position.y.min(surface));
        transform.scale = Vec3::splat(bubble.size());
        if let Some(handle) = pool.for_alpha(bubble.alpha()) {
            if material.0 != *handle {
                material.0 = handle.clone();
            }
        }
        *visibility = Visibility::Visible;
    }
}
