//! Loading RON files and watching a directory for edits.
//!
//! Used by the settings layer for hot reload: the watcher only flips a shared
//! flag, and a Bevy system polls the flag once per frame and does the reload
//! on the main schedule.

use bevy::log::{debug, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Directory watcher that raises a flag when a `.ron` file changes.
pub struct RonWatcher {
    changed: Arc<AtomicBool>,
    _watcher: Option<RecommendedWatcher>, // kept alive for as long as the flag is polled
}

impl RonWatcher {
    /// Watcher with no OS handle. `take_changed` never reports a change.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Whether files changed since the last call. Clears the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Mark as changed, as if the watcher had seen an edit.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self._watcher.is_some()
    }
}

fn is_ron(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ron")
}

/// Sorted list of `.ron` files directly inside `dir`.
fn ron_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_ron(p))
        .collect();
    files.sort();
    files
}

/// Deserialize every `.ron` file in `dir` (sorted by file name).
///
/// Files that fail to read or parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(dir: &str) -> Vec<T> {
    ron_files(Path::new(dir))
        .into_iter()
        .filter_map(|path| {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("failed to read {}: {e}", path.display());
                    return None;
                }
            };
            match ron::from_str::<T>(&content) {
                Ok(item) => {
                    debug!("loaded {}", path.display());
                    Some(item)
                }
                Err(e) => {
                    warn!("failed to parse {}: {e}", path.display());
                    None
                }
            }
        })
        .collect()
}

/// Watch `dir` (non-recursively) for created or modified `.ron` files.
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created or the
/// directory cannot be watched.
pub fn setup_ron_watcher(dir: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let relevant_kind = matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                );
                if relevant_kind && event.paths.iter().any(|p| is_ron(p)) {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("settings watch error: {e}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(dir), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}
