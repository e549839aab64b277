use bevy::prelude::*;
use bevy_atmosphere::prelude::AtmosphereCamera;
use shared::{
    sets::GameUpdateSet,
    ship::{frame_lerp_factor, ShipState},
};

use crate::{
    input::{data::GameAction, keyboard::is_action_just_pressed},
    ship::ShipControls,
    KeyMap,
};

const CHASE_DISTANCE: f32 = 18.0;
const CHASE_HEIGHT: f32 = 7.0;
/// How far ahead of the hull the chase camera looks
const LOOK_AHEAD: f32 = 6.0;
const TOP_DOWN_HEIGHT: f32 = 70.0;
/// Per-frame lerp rate at 60 fps
const FOLLOW_RATE: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Chase,
    TopDown,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Chase => CameraMode::TopDown,
            CameraMode::TopDown => CameraMode::Chase,
        }
    }
}

#[derive(Component, Debug, Default)]
pub struct ChaseCamera {
    pub mode: CameraMode,
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (toggle_camera_system, camera_follow_system)
                .chain()
                .in_set(GameUpdateSet::Camera),
        );
    }
}

/// Where the camera wants to be for a ship in `state`.
pub fn desired_camera_transform(mode: CameraMode, state: &ShipState) -> Transform {
    let forward = state.forward();
    match mode {
        CameraMode::Chase => {
            let eye = state.position - forward * CHASE_DISTANCE + Vec3::Y * CHASE_HEIGHT;
            let target = state.position + forward * LOOK_AHEAD + Vec3::Y * 1.5;
            Transform::from_translation(eye).looking_at(target, Vec3::Y)
        }
        // Bow points up the screen
        CameraMode::TopDown => Transform::from_translation(state.position + Vec3::Y * TOP_DOWN_HEIGHT)
            .looking_at(state.position, forward),
    }
}

fn spawn_camera(mut commands: Commands) {
    let start = desired_camera_transform(CameraMode::Chase, &ShipState::default());
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        start,
        AtmosphereCamera::default(),
        ChaseCamera::default(),
    ));
}

pub fn toggle_camera_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
    mut cameras: Query<&mut ChaseCamera>,
) {
    if !is_action_just_pressed(GameAction::ToggleCamera, &keyboard_input, &key_map) {
        return;
    }
    for mut camera in cameras.iter_mut() {
        camera.mode = camera.mode.toggled();
        info!("Camera mode: {:?}", camera.mode);
    }
}

pub fn camera_follow_system(
    ship_query: Query<&ShipControls>,
    mut cameras: Query<(&ChaseCamera, &mut Transform), Without<ShipControls>>,
    time: Res<Time>,
) {
    let Ok(controls) = ship_query.single() else {
        debug!("ship not found");
        return;
    };
    let factor = frame_lerp_factor(FOLLOW_RATE, time.delta_secs());

    for (camera, mut transform) in cameras.iter_mut() {
        let desired = desired_camera_transform(camera.mode, &controls.state);
        transform.translation = transform.translation.lerp(desired.translation, factor);
        transform.rotation = transform.rotation.slerp(desired.rotation, factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3Swizzles;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_chase_camera_sits_behind_and_above() {
        let state = ShipState::new(Vec3::new(5.0, 0.0, 5.0), FRAC_PI_2);
        let transform = desired_camera_transform(CameraMode::Chase, &state);
        let offset = transform.translation - state.position;
        assert!(offset.dot(state.forward()) < 0.0);
        assert!(offset.y > 0.0);
        // Looking toward the ship
        assert!(transform.forward().dot(state.forward()) > 0.0);
    }

    #[test]
    fn test_top_down_camera_looks_straight_down() {
        let state = ShipState::new(Vec3::new(-3.0, 0.0, 8.0), 0.4);
        let transform = desired_camera_transform(CameraMode::TopDown, &state);
        assert!((transform.translation.xz() - state.position.xz()).length() < 1e-4);
        assert!(transform.forward().dot(Vec3::NEG_Y) > 0.999);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(CameraMode::Chase.toggled(), CameraMode::TopDown);
        assert_eq!(CameraMode::Chase.toggled().toggled(), CameraMode::Chase);
    }
}
