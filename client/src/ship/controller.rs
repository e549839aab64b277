use crate::input::data::GameAction;
use crate::input::keyboard::*;
use crate::KeyMap;
use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionEvent;
use shared::effects::{BubbleSystem, WaterTrail};
use shared::ship::simulate_ship_movement;
use shared::water::WaterSurface;
use shared::GameConfig;

use super::{CurrentShipInput, ShipControls, ShipLandedEvent};

pub fn read_ship_input_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
    mut current_input: ResMut<CurrentShipInput>,
) {
    current_input.0 = ship_input_from_keys(&keyboard_input, &key_map);
}

pub fn ship_control_system(
    mut ship_query: Query<(&mut ShipControls, &mut Transform)>,
    current_input: Res<CurrentShipInput>,
    config: Res<GameConfig>,
    water: Res<WaterSurface>,
    time: Res<Time>,
    mut landed_events: EventWriter<ShipLandedEvent>,
) {
    let Ok((mut controls, mut transform)) = ship_query.single_mut() else {
        debug!("ship not found");
        return;
    };

    let step = simulate_ship_movement(
        &mut controls.state,
        &current_input.0,
        &config.ship,
        &water,
        time.elapsed_secs(),
        time.delta_secs(),
    );

    transform.translation = controls.state.position;
    transform.rotation = controls.state.rotation();

    if step.jumped {
        debug!("Ship left the water at speed {:.1}", controls.state.speed);
    }
    if let Some(impact_speed) = step.landed {
        landed_events.write(ShipLandedEvent {
            position: controls.state.position,
            impact_speed,
        });
    }
}

/// Bounces the ship off whatever Rapier says it started touching.
pub fn ship_collision_system(
    mut collision_events: EventReader<CollisionEvent>,
    mut ship_query: Query<(Entity, &mut ShipControls)>,
    transforms: Query<&GlobalTransform>,
    config: Res<GameConfig>,
) {
    let Ok((ship, mut controls)) = ship_query.single_mut() else {
        collision_events.clear();
        return;
    };

    for event in collision_events.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };
        let other = match (a == ship, b == ship) {
            (true, _) => b,
            (_, true) => a,
            _ => continue,
        };

        let position = controls.state.position;
        let normal = transforms
            .get(other)
            .map(|t| position - t.translation())
            .unwrap_or_else(|_| -controls.state.forward());

        controls.state.bounce_off(normal, &config.ship);
        controls.collisions += 1;
        debug!(
            "Ship hit {:?}, speed now {:.1}, {} collisions",
            other, controls.state.speed, controls.collisions
        );
    }
}

pub fn reset_ship_system(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    key_map: Res<KeyMap>,
    mut ship_query: Query<(&mut ShipControls, &mut Transform)>,
    mut trail: ResMut<WaterTrail>,
    mut bubbles: ResMut<BubbleSystem>,
) {
    if !is_action_just_pressed(GameAction::ResetShip, &keyboard_input, &key_map) {
        return;
    }
    let Ok((mut controls, mut transform)) = ship_query.single_mut() else {
        return;
    };

    controls.reset();
    transform.translation = controls.state.position;
    transform.rotation = controls.state.rotation();
    trail.clear();
    bubbles.clear();
    info!("Ship reset to {:?}", controls.state.position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ship::{ShipInput, ShipState};
    use shared::water::WavePreset;
    use bevy::time::TimeUpdateStrategy;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;
    use std::time::Duration;

    fn sailing_app(input: ShipInput) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<ShipLandedEvent>()
            .insert_resource(GameConfig::default())
            .insert_resource(WaterSurface::new(WavePreset::Still.to_config(0.0)))
            .insert_resource(CurrentShipInput(input))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
            .add_systems(Update, ship_control_system);
        app.world_mut().spawn((
            ShipControls::new(ShipState::default()),
            Transform::default(),
        ));
        // The first update only starts the clock
        app.update();
        app
    }

    #[test]
    fn test_throttle_moves_ship_transform_forward() {
        let mut app = sailing_app(ShipInput {
            throttle: 1.0,
            ..default()
        });
        for _ in 0..60 {
            app.update();
        }

        let mut query = app.world_mut().query::<(&ShipControls, &Transform)>();
        let (controls, transform) = query.single(app.world()).unwrap();
        assert!(controls.state.speed > 0.0);
        // Heading 0 sails toward -Z
        assert!(transform.translation.z < 0.0);
        assert_eq!(transform.translation, controls.state.position);
    }

    #[test]
    fn test_jump_lands_and_reports_impact() {
        let mut app = sailing_app(ShipInput {
            jump: true,
            ..default()
        });
        app.update();
        app.world_mut().resource_mut::<CurrentShipInput>().0 = ShipInput::default();

        let mut landings = Vec::new();
        for _ in 0..300 {
            app.update();
            let events = app.world().resource::<Events<ShipLandedEvent>>();
            let mut cursor = events.get_cursor();
            landings.extend(cursor.read(events).map(|e| e.impact_speed));
        }

        assert!(!landings.is_empty());
        let mut query = app.world_mut().query::<&ShipControls>();
        assert!(!query.single(app.world()).unwrap().state.airborne);
    }

    #[test]
    fn test_reset_restores_spawn() {
        let mut controls = ShipControls::new(ShipState::default());
        controls.state.position = Vec3::new(40.0, 0.0, -12.0);
        controls.state.speed = 10.0;
        controls.collisions = 3;
        controls.reset();
        assert_eq!(controls.state, ShipState::default());
        assert_eq!(controls.collisions, 0);
    }

    #[test]
    fn test_collision_bounces_ship_and_counts_hits() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<CollisionEvent>()
            .insert_resource(GameConfig::default())
            .add_systems(Update, ship_collision_system);

        let mut spawn = ShipState::default();
        spawn.speed = 10.0;
        let ship = app.world_mut().spawn(ShipControls::new(spawn)).id();
        // A rock dead ahead, the ship sails toward -Z
        let rock = app
            .world_mut()
            .spawn(GlobalTransform::from_translation(Vec3::new(0.0, 0.0, -5.0)))
            .id();
        let buoy = app.world_mut().spawn(GlobalTransform::IDENTITY).id();

        app.world_mut()
            .send_event(CollisionEvent::Started(rock, ship, CollisionEventFlags::empty()));
        // Contacts between other bodies are not the ship's business
        app.world_mut()
            .send_event(CollisionEvent::Started(rock, buoy, CollisionEventFlags::empty()));
        app.update();

        let controls = app.world().get::<ShipControls>(ship).unwrap();
        assert_eq!(controls.collisions, 1);
        assert!(controls.state.speed < 0.0);
        assert!(controls.state.position.z > 0.0);

        // Separation events don't bounce
        app.world_mut()
            .send_event(CollisionEvent::Stopped(rock, ship, CollisionEventFlags::empty()));
        app.update();
        assert_eq!(app.world().get::<ShipControls>(ship).unwrap().collisions, 1);
    }
}
