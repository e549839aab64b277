use bevy::prelude::*;

/// Per-frame ordering of the game systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameUpdateSet {
    Input,
    ShipMovement,
    Effects,
    Rendering,
    Camera,
    Ui,
}

/// Ordering of the spawn systems run when sailing starts.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameOnEnterSet {
    World,
    Ship,
    Effects,
    Ui,
}
