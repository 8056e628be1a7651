//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in a settings directory. If several
//! files are present the first one (by file name) that parses and validates
//! wins. Otherwise defaults are used.
use bevy::prelude::*;

use crate::error::ConfigError;
use crate::ron::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;

/// Default settings directory, relative to the working directory.
pub const SETTINGS_DIR: &str = "data/settings";

/// Watches the settings directory; polled by [`check_settings_changes`].
#[derive(Resource)]
pub struct SettingsWatcher {
    pub watcher: RonWatcher,
    pub dir: String,
}

impl SettingsWatcher {
    /// A watcher that never fires. Used when the OS watcher is unavailable.
    #[must_use]
    pub fn stub(dir: &str) -> Self {
        SettingsWatcher { watcher: RonWatcher::stub(), dir: dir.to_string() }
    }
}

/// Load the first valid `Settings` from `dir`, or defaults.
///
/// # Example
/// ```no_run
/// let settings = glidecam::settings::loader::load_settings_from_dir("data/settings");
/// assert!(settings.validate().is_ok());
/// ```
#[must_use]
pub fn load_settings_from_dir(dir: &str) -> Settings {
    let candidates: Vec<Settings> = load_ron_files(dir);
    if candidates.is_empty() {
        info!("no settings found in {dir}, using defaults");
        return Settings::default();
    }
    for candidate in candidates {
        match candidate.validate() {
            Ok(()) => {
                info!("settings loaded from {dir}");
                return candidate;
            }
            Err(e) => warn!("ignoring settings file in {dir}: {e}"),
        }
    }
    Settings::default()
}

/// Reload settings from `dir`, keeping `current` if nothing valid is found.
///
/// Unlike [`load_settings_from_dir`] a broken edit does not fall back to
/// defaults, so a typo during a session keeps the last good tuning.
///
/// # Errors
/// The validation error of the first file that parsed but was rejected.
pub fn reload_settings(dir: &str) -> Result<Option<Settings>, ConfigError> {
    let candidates: Vec<Settings> = load_ron_files(dir);
    let mut first_error = None;
    for candidate in candidates {
        match candidate.validate() {
            Ok(()) => return Ok(Some(candidate)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// Start watching `dir` for edits.
///
/// # Errors
/// [`ConfigError::Watch`] if the OS watcher cannot be set up.
pub fn setup_settings_watcher(dir: &str) -> Result<SettingsWatcher, ConfigError> {
    let watcher = setup_ron_watcher(dir)?;
    Ok(SettingsWatcher { watcher, dir: dir.to_string() })
}

/// Poll the watcher and replace the `Settings` resource when files change.
///
/// Rejected edits leave the resource untouched, so systems watching
/// `Settings` for changes only ever see validated values.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if !watcher.watcher.take_changed() {
        return;
    }
    match reload_settings(&watcher.dir) {
        Ok(Some(next)) => {
            info!("settings changed, reloading");
            *settings = next;
        }
        Ok(None) => warn!("settings changed but nothing parsed in {}, keeping current", watcher.dir),
        Err(e) => warn!("rejected settings reload: {e}"),
    }
}
