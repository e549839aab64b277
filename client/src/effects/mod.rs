pub mod bubbles;
pub mod clouds;
pub mod trail;

use bevy::prelude::*;
use shared::{
    effects::{BubbleSystem, WaterTrail},
    sets::{GameOnEnterSet, GameUpdateSet},
    GameConfig,
};

pub use bubbles::*;
pub use clouds::*;
pub use trail::*;

use crate::GameState;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(GameState::Sailing),
            (
                setup_effect_resources,
                spawn_trail_mesh,
                spawn_bubble_pool,
                setup_clouds,
            )
                .in_set(GameOnEnterSet::Effects),
        )
        .add_systems(
            Update,
            (
                update_trail_system,
                (update_bubbles_system, grow_bubble_pool).chain(),
                update_clouds_system,
            )
                .in_set(GameUpdateSet::Effects),
        )
        .add_systems(
            Update,
            (render_trail_system, render_bubbles_system, render_clouds_system)
                .in_set(GameUpdateSet::Rendering),
        );
    }
}

fn setup_effect_resources(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(WaterTrail::new(config.trail.clone()));
    commands.insert_resource(BubbleSystem::new(config.bubbles.clone(), config.seed));
}
