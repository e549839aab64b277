use std::f32::consts::{PI, TAU};

use bevy::math::{Vec2, Vec3, Vec3Swizzles};

use super::{ShipConfig, ShipInput, ShipState, REFERENCE_FPS};
use crate::water::WaterSurface;

/// Speeds below this are treated as stopped for steering purposes.
const STOPPED_SPEED: f32 = 1e-3;

/// What happened during one simulation step, for effects to react to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipStep {
    pub jumped: bool,
    /// Downward speed at the moment the hull met the water
    pub landed: Option<f32>,
}

/// Frame-rate independent lerp factor for a per-reference-frame `rate`.
#[inline]
pub fn frame_lerp_factor(rate: f32, delta: f32) -> f32 {
    (rate * delta * REFERENCE_FPS).clamp(0.0, 1.0)
}

/// Astern and ahead speed limits. Negative limits from a hand-edited config
/// count as zero.
fn speed_limits(config: &ShipConfig) -> (f32, f32) {
    (
        -config.max_reverse_speed.max(0.0),
        config.max_forward_speed.max(0.0),
    )
}

fn clamp_speed(speed: f32, config: &ShipConfig) -> f32 {
    let (astern, ahead) = speed_limits(config);
    speed.max(astern).min(ahead)
}

pub fn target_speed(input: &ShipInput, config: &ShipConfig) -> f32 {
    let (astern, ahead) = speed_limits(config);
    let throttle = input.throttle.clamp(-1.0, 1.0);
    if throttle >= 0.0 {
        throttle * ahead
    } else {
        -throttle * astern
    }
}

/// Move `current` toward `target`. The acceleration rate applies whenever
/// the target is faster than the current speed, in either direction; the
/// deceleration rate otherwise.
pub fn approach_speed(current: f32, target: f32, config: &ShipConfig, delta: f32) -> f32 {
    let rate = if target.abs() > current.abs() {
        config.acceleration_rate
    } else {
        config.deceleration_rate
    };

    let speed = current + (target - current) * frame_lerp_factor(rate, delta);
    clamp_speed(speed, config)
}

/// Faster ships carve wider turns.
pub fn turn_radius(speed: f32, config: &ShipConfig) -> f32 {
    let ratio = if config.max_forward_speed > 0.0 {
        (speed.abs() / config.max_forward_speed).clamp(0.0, 1.0)
    } else {
        0.0
    };
    config.min_turn_radius + (config.max_turn_radius - config.min_turn_radius) * ratio
}

/// Yaw rate in rad/s. Positive rudder turns to starboard (clockwise seen
/// from above); going astern flips the turn like a real rudder.
pub fn yaw_rate(speed: f32, rudder: f32, config: &ShipConfig) -> f32 {
    if speed.abs() < STOPPED_SPEED {
        return 0.0;
    }
    let radius = turn_radius(speed, config).max(f32::EPSILON);
    -rudder.clamp(-1.0, 1.0) * speed / radius
}

/// Wrap an angle into [-π, π).
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Sinusoidal bob added to the wave height while afloat.
pub fn bob_offset(time: f32, config: &ShipConfig) -> f32 {
    config.bob_amplitude * (time * config.bob_frequency * TAU).sin()
}

/// Pitch that lines the hull up with the wave slope along `forward`.
fn wave_pitch(normal: Vec3, forward: Vec3) -> f32 {
    if normal.y <= f32::EPSILON {
        return 0.0;
    }
    let gradient = Vec2::new(-normal.x / normal.y, -normal.z / normal.y);
    gradient.dot(forward.xz()).atan()
}

/// Advance the ship by `delta` seconds. `time` is the sea clock the wave
/// surface is sampled at, so the hull rides the same waves that are drawn.
pub fn simulate_ship_movement(
    state: &mut ShipState,
    input: &ShipInput,
    config: &ShipConfig,
    water: &WaterSurface,
    time: f32,
    delta: f32,
) -> ShipStep {
    let mut step = ShipStep::default();
    if delta <= 0.0 {
        return step;
    }

    let target = target_speed(input, config);
    state.speed = approach_speed(state.speed, target, config, delta);

    state.heading = wrap_angle(state.heading + yaw_rate(state.speed, input.rudder, config) * delta);
    state.position += state.forward() * state.speed * delta;

    let attitude = frame_lerp_factor(config.attitude_rate, delta);
    let target_roll = -input.rudder.clamp(-1.0, 1.0) * state.speed_ratio(config) * config.max_roll;
    state.roll += (target_roll - state.roll) * attitude;

    let sample = water.sample(state.position.xz(), time);
    let rest_height = sample.height - config.draft + bob_offset(time, config);

    if !state.airborne {
        if input.jump {
            state.vertical_velocity = config.jump_velocity;
            state.airborne = true;
            step.jumped = true;
            log::debug!("Ship jumped at {:?}", state.position);
        } else {
            state.position.y = rest_height;
            state.vertical_velocity = 0.0;
            let target_pitch = wave_pitch(sample.normal, state.forward());
            state.pitch += (target_pitch - state.pitch) * attitude;
        }
    }

    if state.airborne {
        state.vertical_velocity += config.gravity * delta;
        state.position.y += state.vertical_velocity * delta;
        // Nose follows the flight path a little
        state.pitch += ((state.vertical_velocity * 0.02).clamp(-0.3, 0.3) - state.pitch) * attitude;

        if state.position.y <= rest_height && state.vertical_velocity < 0.0 {
            let impact_speed = -state.vertical_velocity;
            state.position.y = rest_height;
            step.landed = Some(impact_speed);

            if impact_speed > config.bounce_threshold {
                state.vertical_velocity = impact_speed * config.landing_restitution;
            } else {
                state.vertical_velocity = 0.0;
                state.airborne = false;
            }
        }
    }

    step
}

impl ShipState {
    /// Knock the ship back after hitting something. `normal` points from the
    /// obstacle toward the ship.
    pub fn bounce_off(&mut self, normal: Vec3, config: &ShipConfig) {
        self.speed = clamp_speed(-self.speed * config.collision_restitution, config);

        let push = normal.with_y(0.0).normalize_or_zero();
        self.position += push * 0.25;
    }
}
