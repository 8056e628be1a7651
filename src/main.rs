use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use glidecam::settings::loader::{self as settings_loader, SETTINGS_DIR};
use glidecam::GlidecamPlugin;

mod app;
use app::{setup, update_player_fill_light};

#[derive(Component)]
struct PlayerFillLight;

/// Where the fill light sits relative to the player sphere.
const FILL_LIGHT_OFFSET: Vec3 = Vec3::new(0.0, 3.0, 0.0);

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR).unwrap_or_else(|e| {
        eprintln!("settings hot reload disabled: {e}");
        settings_loader::SettingsWatcher::stub(SETTINGS_DIR)
    });

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "glidecam".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(GlidecamPlugin);

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, setup);
    app.add_systems(Update, update_player_fill_light);

    app.run();
}
