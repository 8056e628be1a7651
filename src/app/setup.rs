//! Startup scene for the demo binary.
//!
//! Spawns the ground plane, the player sphere, lighting and the orbit
//! camera from the loaded `Settings`. The ground's collision footprint is
//! inserted as `GroundSurfaces` so the sensor and the body integrator see
//! the same floor that is rendered.
use bevy::prelude::*;
use glidecam::physics::{GroundSurface, GroundSurfaces, SphereBody};
use glidecam::player::{MovementController, OrbitCamera, Player};
use glidecam::settings::Settings;

/// Build the demo scene.
///
/// A controller or camera whose settings fail validation is not spawned;
/// the error is logged and the rest of the scene still comes up.
///
/// # Arguments
/// - `commands`: Commands used to spawn entities and insert resources.
/// - `meshes`: Asset storage for the ground plane and player sphere.
/// - `materials`: Asset storage for standard materials.
/// - `settings`: Validated settings loaded before the app started.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<Settings>,
) {
    let physics = &settings.physics;
    let size = physics.ground_size;

    commands.insert_resource(GroundSurfaces(vec![GroundSurface::new(Vec3::ZERO, Vec2::splat(size))]));
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(size, size)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.55, 0.35),
            perceptual_roughness: 0.9,
            ..default()
        }),
        ..default()
    });

    let spawn = physics.spawn_point();
    match MovementController::new(settings.motion, settings.ground_probe) {
        Ok(controller) => {
            commands.spawn((
                PbrBundle {
                    mesh: meshes.add(Sphere::new(physics.body_radius).mesh().uv(32, 18)),
                    material: materials.add(StandardMaterial {
                        base_color: Color::srgb(0.85, 0.35, 0.25),
                        perceptual_roughness: 0.5,
                        ..default()
                    }),
                    transform: Transform::from_translation(spawn),
                    ..default()
                },
                Player,
                SphereBody::from_settings(physics),
                controller,
            ));
        }
        Err(e) => error!("player not spawned: {e}"),
    }

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            illuminance: 8000.0,
            ..default()
        },
        transform: Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn((
        PointLightBundle {
            point_light: PointLight {
                intensity: 4000.0,
                range: 20.0,
                color: Color::srgb(0.9, 0.92, 1.0),
                shadows_enabled: false,
                ..default()
            },
            transform: Transform::from_translation(spawn + crate::FILL_LIGHT_OFFSET),
            ..default()
        },
        crate::PlayerFillLight,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    match OrbitCamera::new(settings.camera, &settings.controls) {
        Ok(camera) => {
            commands.spawn((
                Camera3dBundle {
                    transform: camera.pose(spawn),
                    ..default()
                },
                camera,
            ));
        }
        Err(e) => error!("orbit camera not spawned: {e}"),
    }
}
