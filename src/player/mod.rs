//! Player controller and orbit camera.
//!
//! The module provides the `Player` marker, the movement controller, the
//! orbit camera and [`GlidecamPlugin`], which registers every system in the
//! order the control tick needs.
//!
//! # Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use glidecam::player::{GlidecamPlugin, MovementController, OrbitCamera, Player};
//! use glidecam::physics::SphereBody;
//! use glidecam::settings::Settings;
//!
//! fn spawn(mut commands: Commands, settings: Res<Settings>) {
//!     let Ok(controller) = MovementController::new(settings.motion, settings.ground_probe) else { return };
//!     commands.spawn((
//!         SpatialBundle::from_transform(Transform::from_translation(settings.physics.spawn_point())),
//!         Player,
//!         SphereBody::from_settings(&settings.physics),
//!         controller,
//!     ));
//!     if let Ok(camera) = OrbitCamera::new(settings.camera, &settings.controls) {
//!         commands.spawn((Camera3dBundle::default(), camera));
//!     }
//! }
//!
//! App::new()
//!     .add_plugins((DefaultPlugins, GlidecamPlugin))
//!     .add_systems(Startup, spawn)
//!     .run();
//! ```
pub mod camera;
pub mod ground;
pub mod input;
pub mod movement;

use bevy::input::InputSystem;
use bevy::prelude::*;

pub use camera::*;
pub use ground::*;
pub use input::*;
pub use movement::*;

use crate::physics::{integrate_bodies, GroundSurfaces, SphereBody};
use crate::settings::loader::{check_settings_changes, SettingsWatcher};
use crate::settings::{PhysicsSettings, Settings};

/// Marker for the single body under player control.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Player;

/// Registers input ingestion, the ordered control tick and settings sync.
pub struct GlidecamPlugin;

impl Plugin for GlidecamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Settings>()
            .init_resource::<InputState>()
            .init_resource::<ActionBindings>()
            .init_resource::<PointerCapture>()
            .init_resource::<GroundSurfaces>()
            .add_systems(PreUpdate, collect_key_events.after(InputSystem))
            .add_systems(
                Update,
                (
                    check_settings_changes.run_if(resource_exists::<SettingsWatcher>),
                    sync_player_settings,
                    cursor_grab,
                    camera_look,
                    drive_player,
                    integrate_bodies,
                    orbit_camera,
                )
                    .chain(),
            );
    }
}

/// Push changed `Settings` into bindings, controllers, cameras and bodies.
///
/// Each piece is rebuilt from validated values; a piece that fails to rebuild
/// keeps its previous configuration. `physics.body_radius` and
/// `physics.ground_size` shape the spawned meshes and only take effect on
/// restart; gravity, respawn floor, mass and restitution apply live.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_player_settings(
    settings: Res<Settings>,
    mut bindings: ResMut<ActionBindings>,
    mut controllers: Query<&mut MovementController>,
    mut cameras: Query<&mut OrbitCamera>,
    mut bodies: Query<&mut SphereBody>,
    mut applied_physics: Local<Option<PhysicsSettings>>,
) {
    if !settings.is_changed() {
        return;
    }

    if let Some(previous) = applied_physics.as_ref()
        && (previous.body_radius != settings.physics.body_radius
            || previous.ground_size != settings.physics.ground_size)
    {
        info!("physics.body_radius and physics.ground_size apply on restart");
    }
    for mut body in &mut bodies {
        body.retune(&settings.physics);
    }
    *applied_physics = Some(settings.physics);

    match ActionBindings::from_settings(&settings.controls) {
        Ok(next) => *bindings = next,
        Err(e) => warn!("keeping previous keybinds: {e}"),
    }

    for mut controller in &mut controllers {
        match controller.rebuild(settings.motion, settings.ground_probe) {
            Ok(next) => *controller = next,
            Err(e) => warn!("keeping previous motion tuning: {e}"),
        }
    }

    for mut camera in &mut cameras {
        match camera.rebuild(settings.camera, &settings.controls) {
            Ok(next) => *camera = next,
            Err(e) => warn!("keeping previous camera settings: {e}"),
        }
    }
}
