//! Logical input actions and the held-action set.
//!
//! Raw `KeyboardInput` events are mapped through [`ActionBindings`] into
//! [`InputState`] before the control tick runs. The tick only ever asks
//! "is this action held".

use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::WindowFocused;
use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, Result};
use crate::settings::{ControlsSettings, Settings};

/// Fixed vocabulary of player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    RotateLeft,
    RotateRight,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Forward,
        Action::Back,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::RotateLeft,
        Action::RotateRight,
    ];

    /// Name used in `controls.keybinds`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Back => "back",
            Action::Left => "left",
            Action::Right => "right",
            Action::Jump => "jump",
            Action::RotateLeft => "rotate_left",
            Action::RotateRight => "rotate_right",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Whether this action contributes to the movement impulse.
    #[must_use]
    pub fn is_direction(self) -> bool {
        matches!(self, Action::Forward | Action::Back | Action::Left | Action::Right)
    }
}

/// Actions currently held down.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
}

impl InputState {
    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    #[must_use]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Any of forward/back/left/right held.
    #[must_use]
    pub fn any_direction_held(&self) -> bool {
        self.held.iter().any(|a| a.is_direction())
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Build a state with the given actions held. Handy in tests and benches.
    #[must_use]
    pub fn with(actions: &[Action]) -> Self {
        Self { held: actions.iter().copied().collect() }
    }
}

/// Bindings used for any action that `controls.keybinds` leaves out.
const DEFAULT_KEYS: [(Action, KeyCode); 7] = [
    (Action::Forward, KeyCode::KeyW),
    (Action::Back, KeyCode::KeyS),
    (Action::Left, KeyCode::KeyA),
    (Action::Right, KeyCode::KeyD),
    (Action::Jump, KeyCode::Space),
    (Action::RotateLeft, KeyCode::KeyQ),
    (Action::RotateRight, KeyCode::KeyE),
];

/// Key code to action lookup built from `controls.keybinds`.
///
/// Every action is always bound: configured entries override the default
/// key of their own action only.
#[derive(Resource, Debug, Clone)]
pub struct ActionBindings {
    keys: HashMap<KeyCode, Action>,
}

impl ActionBindings {
    /// # Errors
    /// [`ConfigError::UnknownAction`] or [`ConfigError::UnknownKey`] for an
    /// entry that does not map, [`ConfigError::DuplicateKey`] if two actions
    /// end up on the same key.
    pub fn from_settings(controls: &ControlsSettings) -> Result<Self> {
        let mut chosen: HashMap<Action, KeyCode> = DEFAULT_KEYS.into_iter().collect();
        for (action_name, key_name) in &controls.keybinds {
            let action = Action::from_name(action_name)
                .ok_or_else(|| ConfigError::UnknownAction(action_name.clone()))?;
            let key = Settings::keycode_from_str(key_name).ok_or_else(|| ConfigError::UnknownKey {
                action: action_name.clone(),
                key: key_name.clone(),
            })?;
            chosen.insert(action, key);
        }

        // walk in vocabulary order so the reported pair is stable
        let mut keys = HashMap::with_capacity(chosen.len());
        for action in Action::ALL {
            let Some(&key) = chosen.get(&action) else { continue };
            if let Some(first) = keys.insert(key, action) {
                return Err(ConfigError::DuplicateKey {
                    key: format!("{key:?}"),
                    first: first.name(),
                    second: action.name(),
                });
            }
        }
        Ok(Self { keys })
    }

    #[must_use]
    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.keys.get(&key).copied()
    }
}

impl Default for ActionBindings {
    fn default() -> Self {
        Self { keys: DEFAULT_KEYS.into_iter().map(|(action, key)| (key, action)).collect() }
    }
}

/// Apply one raw key transition. Unbound keys are ignored.
pub fn apply_key(input: &mut InputState, bindings: &ActionBindings, key: KeyCode, state: ButtonState) {
    let Some(action) = bindings.action_for(key) else { return };
    match state {
        ButtonState::Pressed => input.press(action),
        ButtonState::Released => input.release(action),
    }
}

/// Buffer this frame's key events into `InputState`.
///
/// Losing window focus drops every held action: the matching key-up events
/// will never arrive.
#[allow(clippy::needless_pass_by_value)]
pub fn collect_key_events(
    mut keys: EventReader<KeyboardInput>,
    mut focus: EventReader<WindowFocused>,
    bindings: Res<ActionBindings>,
    mut input: ResMut<InputState>,
) {
    for ev in keys.read() {
        apply_key(&mut input, &bindings, ev.key_code, ev.state);
    }
    if focus.read().filter(|ev| !ev.focused).count() > 0 {
        input.clear();
    }
}
