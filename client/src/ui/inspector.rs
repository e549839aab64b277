//! egui window for live tuning of `GameConfig`.

use bevy::{prelude::*, window::PrimaryWindow};
use bevy_inspector_egui::{bevy_egui::EguiContext, bevy_inspector};
use shared::GameConfig;

use crate::input::data::GameAction;
use crate::input::keyboard::is_action_just_pressed;
use crate::KeyMap;

#[derive(Resource, Debug, Default)]
pub struct InspectorVisible(pub bool);

pub fn toggle_inspector_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
    mut visible: ResMut<InspectorVisible>,
) {
    if is_action_just_pressed(GameAction::ToggleInspector, &keyboard_input, &key_map) {
        visible.0 = !visible.0;
    }
}

pub fn toggle_physics_debug_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
    mut config: ResMut<GameConfig>,
) {
    if is_action_just_pressed(GameAction::TogglePhysicsDebug, &keyboard_input, &key_map) {
        config.physics.debug_render = !config.physics.debug_render;
        info!("Collider outlines {}", if config.physics.debug_render { "on" } else { "off" });
    }
}

pub fn inspector_ui(world: &mut World) {
    if !world
        .get_resource::<InspectorVisible>()
        .is_some_and(|visible| visible.0)
    {
        return;
    }

    let Ok(egui_context) = world
        .query_filtered::<&mut EguiContext, With<PrimaryWindow>>()
        .single(world)
    else {
        return;
    };
    let mut egui_context = egui_context.clone();

    egui::Window::new("Sea tuning")
        .default_width(340.0)
        .show(egui_context.get_mut(), |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                bevy_inspector::ui_for_resource::<GameConfig>(world, ui);
            });
        });
}
