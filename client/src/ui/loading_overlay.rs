use bevy::prelude::*;

use crate::{
    ship::{ModelStatus, ShipModel},
    GameState,
};

/// Marker component for the loading overlay UI
#[derive(Component)]
pub struct LoadingOverlay;

/// Marker for the status line under the title
#[derive(Component)]
pub struct LoadingStatusText;

/// Spawns the loading overlay UI, removed when sailing starts
pub fn setup_loading_overlay(mut commands: Commands) {
    commands
        .spawn((
            StateScoped(GameState::Loading),
            LoadingOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Preparing the ship..."),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent.spawn((
                LoadingStatusText,
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgba(0.8, 0.8, 0.8, 1.0)),
                Node {
                    margin: UiRect::top(Val::Px(10.0)),
                    ..default()
                },
            ));
        });
}

pub fn loading_status_text(status: Option<ModelStatus>) -> &'static str {
    match status {
        None => "Looking for the ship model",
        Some(ModelStatus::Loading) => "Loading ship model",
        Some(ModelStatus::Loaded) => "Ship model loaded",
        Some(ModelStatus::Fallback) => "No ship model, building one",
    }
}

/// Shows how far the ship model load has got
pub fn update_loading_overlay(
    model: Option<Res<ShipModel>>,
    mut status_query: Query<&mut Text, With<LoadingStatusText>>,
) {
    let Ok(mut text) = status_query.single_mut() else {
        return;
    };

    let status = loading_status_text(model.map(|m| m.status));
    if text.0 != status {
        text.0 = status.to_string();
    }
}
