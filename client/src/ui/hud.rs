use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};
use shared::{
    effects::{BubbleSystem, CloudField},
    GameConfig,
};

use crate::input::data::GameAction;
use crate::input::keyboard::is_action_just_pressed;
use crate::ship::ShipControls;
use crate::{GameState, KeyMap};

/// Marker to find the container entity so we can show/hide the HUD
#[derive(Component)]
pub struct HudRoot;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudLine {
    Fps,
    Speed,
    Heading,
    Position,
    Collisions,
    Effects,
}

impl HudLine {
    const ALL: [HudLine; 6] = [
        HudLine::Fps,
        HudLine::Speed,
        HudLine::Heading,
        HudLine::Position,
        HudLine::Collisions,
        HudLine::Effects,
    ];
}

/// Everything the HUD shows, gathered once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HudStats {
    pub fps: Option<f64>,
    pub speed: f32,
    pub max_speed: f32,
    /// Heading in radians, 0 faces -Z
    pub heading: f32,
    pub position: Vec3,
    pub airborne: bool,
    pub collisions: u32,
    pub bubbles: usize,
    pub clouds: usize,
}

/// Compass bearing in degrees, 0 = north (-Z), clockwise.
pub fn compass_degrees(heading: f32) -> f32 {
    (360.0 - heading.to_degrees()).rem_euclid(360.0)
}

pub fn hud_line_text(line: HudLine, stats: &HudStats) -> String {
    match line {
        HudLine::Fps => match stats.fps {
            Some(fps) => format!("FPS: {fps:.0}"),
            None => "FPS: N/A".to_string(),
        },
        HudLine::Speed => format!(
            "Speed: {:.1} / {:.0} m/s{}",
            stats.speed,
            stats.max_speed,
            if stats.airborne { " (airborne)" } else { "" }
        ),
        HudLine::Heading => format!("Heading: {:03.0}°", compass_degrees(stats.heading)),
        HudLine::Position => format!(
            "Position: {:.1}, {:.1}, {:.1}",
            stats.position.x, stats.position.y, stats.position.z
        ),
        HudLine::Collisions => format!("Collisions: {}", stats.collisions),
        HudLine::Effects => format!("Bubbles: {}  Clouds: {}", stats.bubbles, stats.clouds),
    }
}

pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            StateScoped(GameState::Sailing),
            // give it a dark background for readability
            BackgroundColor(Color::BLACK.with_alpha(0.5)),
            // make it "always on top" by setting the Z index to maximum
            GlobalZIndex(i32::MAX),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(1.),
                top: Val::Percent(1.),
                bottom: Val::Auto,
                right: Val::Auto,
                padding: UiRect::all(Val::Px(4.0)),
                flex_direction: FlexDirection::Column,
                ..Default::default()
            },
        ))
        .with_children(|parent| {
            for line in HudLine::ALL {
                parent.spawn((
                    line,
                    Text::new("..."),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            }
        });
}

pub fn hud_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    ship_query: Query<&ShipControls>,
    config: Res<GameConfig>,
    bubbles: Option<Res<BubbleSystem>>,
    clouds: Option<Res<CloudField>>,
    mut lines: Query<(&HudLine, &mut Text)>,
) {
    let Ok(controls) = ship_query.single() else {
        return;
    };

    let stats = HudStats {
        fps: diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed()),
        speed: controls.state.speed,
        max_speed: config.ship.max_forward_speed,
        heading: controls.state.heading,
        position: controls.state.position,
        airborne: controls.state.airborne,
        collisions: controls.collisions,
        bubbles: bubbles.map_or(0, |b| b.len()),
        clouds: clouds.map_or(0, |c| c.len()),
    };

    for (line, mut text) in lines.iter_mut() {
        let new_text = hud_line_text(*line, &stats);
        if text.0 != new_text {
            text.0 = new_text;
        }
    }
}

/// Toggle the HUD when pressing the debug key (F3 by default)
pub fn toggle_hud_system(
    mut q: Query<&mut Visibility, With<HudRoot>>,
    kbd: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
) {
    if !is_action_just_pressed(GameAction::ToggleDebugHud, &kbd, &key_map) {
        return;
    }
    let Ok(mut vis) = q.single_mut() else {
        return;
    };
    *vis = match *vis {
        Visibility::Hidden => Visibility::Visible,
        _ => Visibility::Hidden,
    };
}
