//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! through the watcher in [`loader`]. Every field has a serde default so a
//! settings file only needs to list what it changes.
use bevy::prelude::{KeyCode, Resource, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{below, finite, in_range, non_negative, ordered, positive, Result};

/// Input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_x: bool, // Invert horizontal free-look
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Radians of yaw per pixel of pointer motion
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key name
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 0.002 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("rotate_left", "Q"),
            ("rotate_right", "E"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// # Errors
    /// Sensitivity that is not finite.
    pub fn validate(&self) -> Result<()> {
        finite("controls.mouse_sensitivity", self.mouse_sensitivity)?;
        Ok(())
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Tuning for the movement controller. Immutable once a controller is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParameters {
    #[serde(default = "MotionParameters::default_move_speed")]
    pub move_speed: f32, // Impulse per tick per held direction key
    #[serde(default = "MotionParameters::default_jump_force")]
    pub jump_force: f32, // Upward impulse of a jump
    #[serde(default = "MotionParameters::default_move_friction")]
    pub move_friction: f32, // Horizontal velocity multiplier while a direction key is held
    #[serde(default = "MotionParameters::default_stop_friction")]
    pub stop_friction: f32, // Horizontal velocity multiplier with no direction key
    #[serde(default = "MotionParameters::default_stop_threshold")]
    pub stop_threshold: f32, // Below this on both axes the body is stopped
    #[serde(default = "MotionParameters::default_max_velocity")]
    pub max_velocity: f32, // Horizontal speed ceiling
    #[serde(default = "MotionParameters::default_glide_delay")]
    pub glide_delay: f32, // Seconds airborne before gliding starts
    #[serde(default = "MotionParameters::default_glide_fall_rate")]
    pub glide_fall_rate: f32, // Falling velocity multiplier while gliding
    #[serde(default = "MotionParameters::default_glide_speed_multiplier")]
    pub glide_speed_multiplier: f32, // Movement impulse multiplier while gliding
    #[serde(default = "MotionParameters::default_max_glide_velocity")]
    pub max_glide_velocity: f32, // Horizontal speed ceiling while gliding
}

impl MotionParameters {
    fn default_move_speed() -> f32 { 0.4 }
    fn default_jump_force() -> f32 { 6.0 }
    fn default_move_friction() -> f32 { 0.95 }
    fn default_stop_friction() -> f32 { 0.85 }
    fn default_stop_threshold() -> f32 { 0.05 }
    fn default_max_velocity() -> f32 { 8.0 }
    fn default_glide_delay() -> f32 { 0.5 }
    fn default_glide_fall_rate() -> f32 { 0.9 }
    fn default_glide_speed_multiplier() -> f32 { 1.5 }
    fn default_max_glide_velocity() -> f32 { 12.0 }

    /// # Errors
    /// The first field that is non-finite, negative where it must not be, or
    /// outside its range.
    pub fn validate(&self) -> Result<()> {
        non_negative("motion.move_speed", self.move_speed)?;
        non_negative("motion.jump_force", self.jump_force)?;
        in_range("motion.move_friction", self.move_friction, 0.0, 1.0)?;
        in_range("motion.stop_friction", self.stop_friction, 0.0, 1.0)?;
        // stopping decelerates at least as hard as moving
        ordered(
            ("motion.stop_friction", self.stop_friction),
            ("motion.move_friction", self.move_friction),
        )?;
        non_negative("motion.stop_threshold", self.stop_threshold)?;
        positive("motion.max_velocity", self.max_velocity)?;
        non_negative("motion.glide_delay", self.glide_delay)?;
        positive("motion.glide_fall_rate", self.glide_fall_rate)?;
        below("motion.glide_fall_rate", self.glide_fall_rate, 1.0)?;
        non_negative("motion.glide_speed_multiplier", self.glide_speed_multiplier)?;
        positive("motion.max_glide_velocity", self.max_glide_velocity)?;
        Ok(())
    }
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            move_speed: Self::default_move_speed(),
            jump_force: Self::default_jump_force(),
            move_friction: Self::default_move_friction(),
            stop_friction: Self::default_stop_friction(),
            stop_threshold: Self::default_stop_threshold(),
            max_velocity: Self::default_max_velocity(),
            glide_delay: Self::default_glide_delay(),
            glide_fall_rate: Self::default_glide_fall_rate(),
            glide_speed_multiplier: Self::default_glide_speed_multiplier(),
            max_glide_velocity: Self::default_max_glide_velocity(),
        }
    }
}

/// Downward ground probe geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundProbe {
    #[serde(default = "GroundProbe::default_distance")]
    pub distance: f32, // Ray length, about 1.5x the body radius
    #[serde(default = "GroundProbe::default_vertical_offset")]
    pub vertical_offset: f32, // Ray starts this far above the body centre
}

impl GroundProbe {
    fn default_distance() -> f32 { 1.5 }
    fn default_vertical_offset() -> f32 { 0.1 }

    /// # Errors
    /// Non-positive distance or negative offset.
    pub fn validate(&self) -> Result<()> {
        positive("ground_probe.distance", self.distance)?;
        non_negative("ground_probe.vertical_offset", self.vertical_offset)?;
        Ok(())
    }
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            distance: Self::default_distance(),
            vertical_offset: Self::default_vertical_offset(),
        }
    }
}

/// How the orbit camera's yaw is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPolicy {
    /// Pointer motion turns the camera while the pointer is captured.
    #[default]
    FreeLook,
    /// Rotate keys request animated quarter turns.
    SnapOrbit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default)]
    pub policy: CameraPolicy,
    #[serde(default = "CameraSettings::default_distance")]
    pub distance: f32, // Horizontal distance behind the body
    #[serde(default = "CameraSettings::default_height")]
    pub height: f32, // Height above the body
    #[serde(default = "CameraSettings::default_snap_step")]
    pub snap_step: f32, // Radians turned per tick during a snap rotation
    #[serde(default)]
    pub initial_yaw: f32, // Yaw at spawn
}

impl CameraSettings {
    fn default_distance() -> f32 { 4.5 }
    fn default_height() -> f32 { 2.0 }
    fn default_snap_step() -> f32 { 0.05 }

    /// # Errors
    /// Non-positive distance or step, non-finite height or yaw.
    pub fn validate(&self) -> Result<()> {
        positive("camera.distance", self.distance)?;
        finite("camera.height", self.height)?;
        positive("camera.snap_step", self.snap_step)?;
        finite("camera.initial_yaw", self.initial_yaw)?;
        Ok(())
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            policy: CameraPolicy::default(),
            distance: Self::default_distance(),
            height: Self::default_height(),
            snap_step: Self::default_snap_step(),
            initial_yaw: 0.0,
        }
    }
}

/// Demo host physics. Only read by the stand-in sphere body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "PhysicsSettings::default_gravity")]
    pub gravity: f32, // Vertical acceleration
    #[serde(default = "PhysicsSettings::default_body_radius")]
    pub body_radius: f32,
    #[serde(default = "PhysicsSettings::default_body_mass")]
    pub body_mass: f32,
    #[serde(default = "PhysicsSettings::default_restitution")]
    pub restitution: f32, // Bounce factor on landing
    #[serde(default = "PhysicsSettings::default_ground_size")]
    pub ground_size: f32, // Edge length of the square ground
    #[serde(default = "PhysicsSettings::default_spawn_height")]
    pub spawn_height: f32, // Body centre height at spawn
    #[serde(default = "PhysicsSettings::default_respawn_floor")]
    pub respawn_floor: f32, // Falling below this respawns the body
}

impl PhysicsSettings {
    fn default_gravity() -> f32 { -9.81 }
    fn default_body_radius() -> f32 { 1.0 }
    fn default_body_mass() -> f32 { 1.0 }
    fn default_restitution() -> f32 { 0.3 }
    fn default_ground_size() -> f32 { 20.0 }
    fn default_spawn_height() -> f32 { 1.0 }
    fn default_respawn_floor() -> f32 { -30.0 }

    #[must_use]
    pub fn spawn_point(&self) -> Vec3 {
        Vec3::new(0.0, self.spawn_height, 0.0)
    }

    /// # Errors
    /// Non-finite gravity, non-positive radius/mass/ground, restitution
    /// outside `[0, 1]`, spawn below the respawn floor.
    pub fn validate(&self) -> Result<()> {
        finite("physics.gravity", self.gravity)?;
        positive("physics.body_radius", self.body_radius)?;
        positive("physics.body_mass", self.body_mass)?;
        in_range("physics.restitution", self.restitution, 0.0, 1.0)?;
        positive("physics.ground_size", self.ground_size)?;
        finite("physics.respawn_floor", self.respawn_floor)?;
        in_range("physics.spawn_height", self.spawn_height, self.respawn_floor, f32::MAX)?;
        Ok(())
    }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Self::default_gravity(),
            body_radius: Self::default_body_radius(),
            body_mass: Self::default_body_mass(),
            restitution: Self::default_restitution(),
            ground_size: Self::default_ground_size(),
            spawn_height: Self::default_spawn_height(),
            respawn_floor: Self::default_respawn_floor(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub motion: MotionParameters,
    #[serde(default)]
    pub ground_probe: GroundProbe,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
}

impl Settings {
    /// Check every section, then every keybind.
    ///
    /// # Errors
    /// The first invalid value found.
    pub fn validate(&self) -> Result<()> {
        self.controls.validate()?;
        self.motion.validate()?;
        self.ground_probe.validate()?;
        self.camera.validate()?;
        self.physics.validate()?;
        crate::player::ActionBindings::from_settings(&self.controls)?;
        Ok(())
    }

    /// Convert a key name from `controls.keybinds` (e.g. "W", "Space",
    /// "ArrowLeft") into a Bevy `KeyCode`. Case-insensitive.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "SPACE" => KeyCode::Space,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}

pub mod loader;
