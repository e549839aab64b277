use std::path::PathBuf;

use bevy::prelude::Resource;

pub mod config;
pub mod constants;
pub mod effects;
pub mod physics;
pub mod sets;
pub mod ship;
pub mod water;

pub use config::{load_or_create_config, ConfigError, GameConfig, WaterConfig};
pub use constants::*;

#[derive(Resource, Debug, Clone)]
pub struct GameFolderPaths {
    /// Holds `config.ron` and `keybinds.ron`
    pub game_folder_path: PathBuf,
    /// Root of the asset server (models, textures)
    pub assets_folder_path: PathBuf,
}

impl GameFolderPaths {
    pub fn config_path(&self) -> PathBuf {
        self.game_folder_path.join(CONFIG_FILE)
    }

    pub fn binds_path(&self) -> PathBuf {
        self.game_folder_path.join(BINDS_FILE)
    }
}

pub fn get_game_folder_paths(
    game_folder_path: Option<String>,
    assets_folder_path: Option<String>,
) -> GameFolderPaths {
    let mut paths = default_game_folder_paths();

    if let Some(game_data) = game_folder_path {
        paths.game_folder_path = game_data.into();
    }
    if let Some(game_assets) = assets_folder_path {
        paths.assets_folder_path = game_assets.into();
    }

    paths
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(target_os = "windows")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    let base = std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(home_dir)
        .join("seafarer");
    GameFolderPaths {
        assets_folder_path: base.join("assets"),
        game_folder_path: base,
    }
}

#[cfg(target_os = "macos")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    let base = home_dir().join("Library/Application Support/seafarer");
    GameFolderPaths {
        assets_folder_path: base.join("assets"),
        game_folder_path: base,
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: home_dir().join(".config/seafarer"),
        assets_folder_path: home_dir().join(".local/share/seafarer/assets"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_defaults() {
        let paths = get_game_folder_paths(Some("/tmp/sea".into()), None);
        assert_eq!(paths.game_folder_path, PathBuf::from("/tmp/sea"));
        assert_eq!(paths.config_path(), PathBuf::from("/tmp/sea/config.ron"));
        assert_eq!(paths.binds_path(), PathBuf::from("/tmp/sea/keybinds.ron"));
        assert_eq!(
            paths.assets_folder_path,
            default_game_folder_paths().assets_folder_path
        );
    }
}
