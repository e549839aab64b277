use bevy::prelude::*;
use shared::{
    effects::{BubbleSystem, CloudField, WaterTrail},
    physics::PhysicsConfig,
    sets::{GameOnEnterSet, GameUpdateSet},
    water::WaterSurface,
    GameConfig,
};

use crate::{
    camera::CameraPlugin, effects::EffectsPlugin, ship::ShipPlugin, ui::UiPlugin,
    world::WorldPlugin, GameState,
};

pub fn game_plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameUpdateSet::Input,
            GameUpdateSet::ShipMovement,
            GameUpdateSet::Effects,
            GameUpdateSet::Rendering,
            GameUpdateSet::Camera,
            GameUpdateSet::Ui,
        )
            .chain()
            .run_if(in_state(GameState::Sailing)),
    )
    .configure_sets(
        OnEnter(GameState::Sailing),
        (
            GameOnEnterSet::World,
            GameOnEnterSet::Ship,
            GameOnEnterSet::Effects,
            GameOnEnterSet::Ui,
        )
            .chain(),
    )
    .add_plugins((WorldPlugin, ShipPlugin, EffectsPlugin, CameraPlugin, UiPlugin))
    .add_systems(OnEnter(GameState::Sailing), log_sailing_started)
    .add_systems(
        Update,
        apply_config_changes.before(GameUpdateSet::Input),
    );
}

fn log_sailing_started(config: Res<GameConfig>) {
    info!(
        "Setting sail on a {} sea ({} floating bodies)",
        config.water.preset, config.floating_bodies
    );
}

/// Pushes edits made to `GameConfig` (inspector or hot reload) into the
/// resources that were built from it.
pub fn apply_config_changes(
    config: Res<GameConfig>,
    mut physics_config: ResMut<PhysicsConfig>,
    mut water: ResMut<WaterSurface>,
    trail: Option<ResMut<WaterTrail>>,
    bubbles: Option<ResMut<BubbleSystem>>,
    clouds: Option<ResMut<CloudField>>,
) {
    if !config.is_changed() || config.is_added() {
        return;
    }

    if *physics_config != config.physics {
        *physics_config = config.physics.clone();
    }

    let waves = config.water.preset.to_config(config.water.base_level);
    if *water.config() != waves {
        debug!("Sea state changed to {}", config.water.preset);
        water.set_config(waves);
    }

    if let Some(mut trail) = trail {
        trail.config = config.trail.clone();
    }
    if let Some(mut bubbles) = bubbles {
        bubbles.config = config.bubbles.clone();
    }
    if let Some(mut clouds) = clouds {
        clouds.config = config.clouds.clone();
    }
}
