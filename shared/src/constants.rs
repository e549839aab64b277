pub const CONFIG_FILE: &str = "config.ron";
pub const BINDS_FILE: &str = "keybinds.ron";
pub const SHIP_MODEL_PATH: &str = "models/ship.glb";
pub const CONFIG_LOAD_ERROR: &str = "Failed to load config, falling back to defaults";
