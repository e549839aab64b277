pub mod hud;
pub mod inspector;
pub mod loading_overlay;

use bevy::prelude::*;
use shared::sets::{GameOnEnterSet, GameUpdateSet};

use crate::{
    ui::{
        hud::{hud_text_update_system, setup_hud, toggle_hud_system},
        inspector::{inspector_ui, toggle_inspector_system, toggle_physics_debug_system, InspectorVisible},
        loading_overlay::{setup_loading_overlay, update_loading_overlay},
    },
    GameState,
};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InspectorVisible>()
            .add_systems(OnEnter(GameState::Loading), setup_loading_overlay)
            .add_systems(
                Update,
                update_loading_overlay.run_if(in_state(GameState::Loading)),
            )
            .add_systems(OnEnter(GameState::Sailing), setup_hud.in_set(GameOnEnterSet::Ui))
            .add_systems(
                Update,
                (
                    hud_text_update_system,
                    toggle_hud_system,
                    toggle_inspector_system,
                    toggle_physics_debug_system,
                )
                    .in_set(GameUpdateSet::Ui),
            )
            .add_systems(Update, inspector_ui.after(GameUpdateSet::Ui));
    }
}
