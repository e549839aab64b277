pub mod environment;
pub mod floating;
pub mod water;

use bevy::prelude::*;
use shared::sets::{GameOnEnterSet, GameUpdateSet};

pub use environment::*;
pub use floating::*;
pub use water::*;

use crate::GameState;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_environment)
            .add_systems(
                OnEnter(GameState::Sailing),
                (spawn_water, spawn_floating_bodies, spawn_obstacles)
                    .in_set(GameOnEnterSet::World),
            )
            .add_systems(
                Update,
                respawn_lost_bodies.in_set(GameUpdateSet::ShipMovement),
            )
            .add_systems(Update, update_water_mesh.in_set(GameUpdateSet::Rendering));
    }
}
