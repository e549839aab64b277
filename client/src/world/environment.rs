use bevy::{pbr::CascadeShadowConfigBuilder, prelude::*};

/// Direction the sunlight travels in, low enough to give long shadows.
const SUN_DIRECTION: Vec3 = Vec3::new(-0.4, -0.6, -0.35);

#[derive(Component)]
pub struct Sun;

pub fn setup_environment(mut commands: Commands) {
    commands.insert_resource(ClearColor(Color::srgb(0.55, 0.72, 0.9)));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.75, 0.85, 1.0),
        brightness: 400.0,
        ..default()
    });

    let cascades = CascadeShadowConfigBuilder {
        num_cascades: 3,
        first_cascade_far_bound: 25.0,
        maximum_distance: 250.0,
        ..default()
    }
    .build();

    commands.spawn((
        Name::new("Sun"),
        Sun,
        DirectionalLight {
            illuminance: light_consts::lux::AMBIENT_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(-SUN_DIRECTION * 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        cascades,
    ));
}
