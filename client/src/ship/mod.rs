pub mod controller;
pub mod model;

use bevy::prelude::*;
use shared::{
    physics::ShipPhysicsBundle,
    sets::{GameOnEnterSet, GameUpdateSet},
    ship::{ShipInput, ShipState},
    GameConfig,
};

pub use controller::*;
pub use model::*;

use crate::GameState;

/// The player's ship. `spawn` is where `ResetShip` puts it back.
#[derive(Component, Debug, Clone)]
pub struct ShipControls {
    pub state: ShipState,
    pub spawn: ShipState,
    /// Obstacles and floating bodies hit since the last reset
    pub collisions: u32,
}

impl ShipControls {
    pub fn new(spawn: ShipState) -> Self {
        Self {
            state: spawn,
            spawn,
            collisions: 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = self.spawn;
        self.collisions = 0;
    }
}

/// Sent when the hull comes back down onto the water after a jump or bounce.
#[derive(Event, Debug, Clone, Copy)]
pub struct ShipLandedEvent {
    pub position: Vec3,
    /// Downward speed at impact (m/s)
    pub impact_speed: f32,
}

/// Input gathered this frame, consumed by the ship controls.
#[derive(Resource, Debug, Default)]
pub struct CurrentShipInput(pub ShipInput);

pub struct ShipPlugin;

impl Plugin for ShipPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShipLandedEvent>()
            .init_resource::<CurrentShipInput>()
            .add_systems(Startup, start_ship_model_load)
            .add_systems(
                Update,
                poll_ship_model.run_if(in_state(GameState::Loading)),
            )
            .add_systems(
                OnEnter(GameState::Sailing),
                spawn_ship.in_set(GameOnEnterSet::Ship),
            )
            .add_systems(Update, read_ship_input_system.in_set(GameUpdateSet::Input))
            .add_systems(
                Update,
                (reset_ship_system, ship_control_system, ship_collision_system)
                    .chain()
                    .in_set(GameUpdateSet::ShipMovement),
            );
    }
}

pub fn spawn_ship(
    mut commands: Commands,
    config: Res<GameConfig>,
    model: Res<ShipModel>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let spawn = ShipState::new(Vec3::new(0.0, config.water.base_level, 0.0), 0.0);

    commands
        .spawn((
            Name::new("Ship"),
            ShipControls::new(spawn),
            Transform::from_translation(spawn.position).with_rotation(spawn.rotation()),
            Visibility::default(),
            ShipPhysicsBundle::new(config.ship.hull_size),
            StateScoped(GameState::Sailing),
        ))
        .with_children(|parent| {
            spawn_ship_visual(parent, &model, &config.ship, &mut meshes, &mut materials);
        });

    info!("Ship spawned with a {:?} model", model.status);
}
