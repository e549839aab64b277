mod camera;
mod effects;
mod game;
mod input;
mod ship;
mod ui;
mod world;

use std::{collections::BTreeMap, path::PathBuf};

use bevy::{
    diagnostic::FrameTimeDiagnosticsPlugin, log::LogPlugin, prelude::*, window::PresentMode,
};
use bevy_atmosphere::prelude::AtmospherePlugin;
use bevy_inspector_egui::{bevy_egui::EguiPlugin, DefaultInspectorConfigPlugin};
use clap::Parser;
use input::{data::GameAction, keyboard::get_bindings};
use serde::{Deserialize, Serialize};
use shared::{
    get_game_folder_paths, load_or_create_config, physics::SeafarerPhysicsPlugin,
    water::{WavePreset, WaterSurface},
    GameConfig, CONFIG_LOAD_ERROR,
};

const DEFAULT_LOG_FILTER: &str = "wgpu=error,naga=warn,seafarer=info,shared=info";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    game_folder_path: Option<String>,

    #[arg(
        short,
        long,
        help = "Allows overriding of the asset folder path, defaults to the platform data folder"
    )]
    assets_folder_path: Option<String>,

    #[arg(short, long, help = "Config file to use instead of <game_folder_path>/config.ron")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Sea state: still, calm, lake, ocean or storm")]
    wave_preset: Option<WavePreset>,

    #[arg(long, help = "Seed for clouds, bubbles and floating bodies")]
    seed: Option<u64>,

    #[arg(long, help = "Log filter, e.g. \"info,seafarer=debug\"")]
    log_filter: Option<String>,
}

// Enum that will be used as a global state for the game
#[derive(Clone, Copy, Default, Eq, PartialEq, Debug, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Sailing,
}

#[derive(Resource, Serialize, Deserialize)]
pub struct KeyMap {
    #[serde(default = "input::keyboard::default_key_map")]
    pub map: BTreeMap<GameAction, Vec<KeyCode>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            map: input::keyboard::default_key_map(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let game_folder_paths = get_game_folder_paths(args.game_folder_path, args.assets_folder_path);

    println!(
        "Starting application with game folder: {}",
        game_folder_paths.game_folder_path.display()
    );

    // The log plugin is not up yet, so config problems go to stderr
    let config_path = args
        .config
        .unwrap_or_else(|| game_folder_paths.config_path());
    let mut config = match load_or_create_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{CONFIG_LOAD_ERROR} ({}): {e}", config_path.display());
            GameConfig::default()
        }
    };
    if let Some(preset) = args.wave_preset {
        config.water.preset = preset;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    println!(
        "Sea state: {}, seed: {}",
        config.water.preset, config.seed
    );

    let water = WaterSurface::new(config.water.preset.to_config(config.water.base_level));

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(AssetPlugin {
                file_path: game_folder_paths
                    .assets_folder_path
                    .to_string_lossy()
                    .into_owned(),
                ..Default::default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Seafarer".to_string(),
                    present_mode: PresentMode::AutoVsync,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: args
                    .log_filter
                    .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                ..default()
            }),
    );

    app.add_plugins(EguiPlugin {
        enable_multipass_for_primary_context: false,
    })
    .add_plugins(DefaultInspectorConfigPlugin)
    .add_plugins(FrameTimeDiagnosticsPlugin::default());

    app.insert_resource(config.physics.clone())
        .add_plugins(SeafarerPhysicsPlugin)
        .add_plugins(AtmospherePlugin);

    app.insert_resource(get_bindings(&game_folder_paths))
        .insert_resource(game_folder_paths)
        .insert_resource(water)
        .insert_resource(config)
        .register_type::<GameConfig>()
        // Declare the game state, whose starting value is determined by the `Default` trait
        .init_state::<GameState>()
        .enable_state_scoped_entities::<GameState>()
        .add_plugins(game::game_plugin)
        .run();
}
