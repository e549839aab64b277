use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameAction {
    Accelerate,
    Decelerate,
    TurnLeft,
    TurnRight,
    Jump,
    ResetShip,
    ToggleCamera,
    ToggleDebugHud,
    ToggleInspector,
    TogglePhysicsDebug,
}
