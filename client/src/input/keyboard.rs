use crate::{input::data::GameAction, KeyMap};
use bevy::prelude::*;
use ron::{from_str, ser::PrettyConfig};
use shared::{ship::ShipInput, GameFolderPaths};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::Path,
};

fn write_keybindings_to_path(key_map: &KeyMap, binds_path: &Path) -> Result<(), std::io::Error> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(true);

    let serialized = ron::ser::to_string_pretty(key_map, pretty_config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    if let Some(parent) = binds_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(binds_path)?;
    file.write_all(serialized.as_bytes())
}

pub fn is_action_pressed(
    action: GameAction,
    keyboard_input: &ButtonInput<KeyCode>,
    key_map: &KeyMap,
) -> bool {
    key_map
        .map
        .get(&action)
        .is_some_and(|keys| keyboard_input.any_pressed(keys.iter().copied()))
}

pub fn is_action_just_pressed(
    action: GameAction,
    keyboard_input: &ButtonInput<KeyCode>,
    key_map: &KeyMap,
) -> bool {
    key_map
        .map
        .get(&action)
        .is_some_and(|keys| keyboard_input.any_just_pressed(keys.iter().copied()))
}

fn axis(
    negative: GameAction,
    positive: GameAction,
    keyboard_input: &ButtonInput<KeyCode>,
    key_map: &KeyMap,
) -> f32 {
    let mut value = 0.0;
    if is_action_pressed(positive, keyboard_input, key_map) {
        value += 1.0;
    }
    if is_action_pressed(negative, keyboard_input, key_map) {
        value -= 1.0;
    }
    value
}

/// Translate the held keys into this frame's ship input.
pub fn ship_input_from_keys(keyboard_input: &ButtonInput<KeyCode>, key_map: &KeyMap) -> ShipInput {
    ShipInput {
        throttle: axis(
            GameAction::Decelerate,
            GameAction::Accelerate,
            keyboard_input,
            key_map,
        ),
        rudder: axis(
            GameAction::TurnLeft,
            GameAction::TurnRight,
            keyboard_input,
            key_map,
        ),
        jump: is_action_just_pressed(GameAction::Jump, keyboard_input, key_map),
    }
}

pub(crate) fn default_key_map() -> BTreeMap<GameAction, Vec<KeyCode>> {
    let mut map = BTreeMap::new();
    map.insert(GameAction::Accelerate, vec![KeyCode::KeyW, KeyCode::ArrowUp]);
    map.insert(
        GameAction::Decelerate,
        vec![KeyCode::KeyS, KeyCode::ArrowDown],
    );
    map.insert(GameAction::TurnLeft, vec![KeyCode::KeyA, KeyCode::ArrowLeft]);
    map.insert(
        GameAction::TurnRight,
        vec![KeyCode::KeyD, KeyCode::ArrowRight],
    );
    map.insert(GameAction::Jump, vec![KeyCode::Space]);
    map.insert(GameAction::ResetShip, vec![KeyCode::KeyR]);
    map.insert(GameAction::ToggleCamera, vec![KeyCode::KeyC]);
    map.insert(GameAction::ToggleDebugHud, vec![KeyCode::F3]);
    map.insert(GameAction::ToggleInspector, vec![KeyCode::F4]);
    map.insert(GameAction::TogglePhysicsDebug, vec![KeyCode::F5]);
    map
}

pub fn get_bindings(game_folder_paths: &GameFolderPaths) -> KeyMap {
    let binds_path = game_folder_paths.binds_path();

    if let Ok(content) = fs::read_to_string(&binds_path) {
        return match from_str::<KeyMap>(&content) {
            Ok(key_map) => key_map,
            // Leave the file alone so the user can fix it
            Err(e) => {
                warn!(
                    "Invalid keybindings at {:?}, using defaults: {}",
                    binds_path, e
                );
                KeyMap::default()
            }
        };
    }

    let key_map = KeyMap::default();
    if let Err(e) = write_keybindings_to_path(&key_map, &binds_path) {
        error!(
            "Failed to create default keybindings file at {:?}: {}",
            binds_path, e
        );
    }
    key_map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(keys: &[KeyCode]) -> ButtonInput<KeyCode> {
        let mut input = ButtonInput::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn test_every_action_has_a_default_binding() {
        let key_map = KeyMap::default();
        for action in [
            GameAction::Accelerate,
            GameAction::Decelerate,
            GameAction::TurnLeft,
            GameAction::TurnRight,
            GameAction::Jump,
            GameAction::ResetShip,
            GameAction::ToggleCamera,
            GameAction::ToggleDebugHud,
            GameAction::ToggleInspector,
            GameAction::TogglePhysicsDebug,
        ] {
            assert!(key_map.map.get(&action).is_some_and(|k| !k.is_empty()));
        }
    }

    #[test]
    fn test_ship_input_from_keys() {
        let key_map = KeyMap::default();

        let input = ship_input_from_keys(&pressed(&[KeyCode::KeyW, KeyCode::KeyD]), &key_map);
        assert_eq!(input.throttle, 1.0);
        assert_eq!(input.rudder, 1.0);
        assert!(!input.jump);

        let input = ship_input_from_keys(&pressed(&[KeyCode::ArrowDown, KeyCode::ArrowLeft]), &key_map);
        assert_eq!(input.throttle, -1.0);
        assert_eq!(input.rudder, -1.0);

        // Opposing keys cancel out
        let input = ship_input_from_keys(&pressed(&[KeyCode::KeyA, KeyCode::KeyD]), &key_map);
        assert_eq!(input.rudder, 0.0);

        let input = ship_input_from_keys(&pressed(&[KeyCode::Space]), &key_map);
        assert!(input.jump);
    }

    #[test]
    fn test_bindings_file_is_created_then_read_back() {
        let folder = std::env::temp_dir().join(format!("seafarer-binds-test-{}", std::process::id()));
        let paths = GameFolderPaths {
            game_folder_path: folder.clone(),
            assets_folder_path: folder.join("assets"),
        };
        let _ = fs::remove_dir_all(&folder);

        let created = get_bindings(&paths);
        assert!(paths.binds_path().exists());
        let reloaded = get_bindings(&paths);
        assert_eq!(created.map, reloaded.map);

        let _ = fs::remove_dir_all(&folder);
    }

    #[test]
    fn test_invalid_bindings_file_is_kept() {
        let folder = std::env::temp_dir().join(format!("seafarer-bad-binds-{}", std::process::id()));
        let paths = GameFolderPaths {
            game_folder_path: folder.clone(),
            assets_folder_path: folder.join("assets"),
        };
        let _ = fs::remove_dir_all(&folder);
        fs::create_dir_all(&folder).unwrap();
        let broken = "(map: { Jump: [Spaec ";
        fs::write(paths.binds_path(), broken).unwrap();

        let key_map = get_bindings(&paths);
        assert_eq!(key_map.map, KeyMap::default().map);
        assert_eq!(fs::read_to_string(paths.binds_path()).unwrap(), broken);

        let _ = fs::remove_dir_all(&folder);
    }
}
