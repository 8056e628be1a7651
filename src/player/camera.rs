//! Third-person orbit camera.
//!
//! The camera sits `distance` behind and `height` above the player along its
//! yaw and always looks at the player. Yaw is driven either by pointer motion
//! (free-look, only while the pointer is captured) or by animated quarter
//! turns requested from the rotate keys (snap-orbit).

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::error::Result;
use crate::physics::YawSource;
use crate::player::input::{Action, InputState};
use crate::player::Player;
use crate::settings::{CameraPolicy, CameraSettings, ControlsSettings};

/// Key that hands the pointer back to the OS.
pub const RELEASE_POINTER_KEY: KeyCode = KeyCode::Escape;

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in `(-PI, PI]`.
#[must_use]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Quarter-turn direction for snap-orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapDirection {
    /// Yaw increases.
    Left,
    /// Yaw decreases.
    Right,
}

impl SnapDirection {
    #[must_use]
    pub fn delta(self) -> f32 {
        match self {
            SnapDirection::Left => FRAC_PI_2,
            SnapDirection::Right => -FRAC_PI_2,
        }
    }
}

/// Orbit camera state.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    yaw: f32,
    target_yaw: Option<f32>,
    settings: CameraSettings,
    sensitivity: f32,
    invert_x: bool,
}

impl OrbitCamera {
    /// # Errors
    /// Invalid camera or control settings.
    pub fn new(settings: CameraSettings, controls: &ControlsSettings) -> Result<Self> {
        settings.validate()?;
        controls.validate()?;
        Ok(Self {
            yaw: normalize_angle(settings.initial_yaw),
            target_yaw: None,
            settings,
            sensitivity: controls.mouse_sensitivity,
            invert_x: controls.invert_x,
        })
    }

    /// Same camera with new settings; keeps yaw and any rotation in flight.
    ///
    /// # Errors
    /// Invalid camera or control settings.
    pub fn rebuild(&self, settings: CameraSettings, controls: &ControlsSettings) -> Result<Self> {
        let mut next = Self::new(settings, controls)?;
        next.yaw = self.yaw;
        next.target_yaw = self.target_yaw;
        Ok(next)
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn target_yaw(&self) -> Option<f32> {
        self.target_yaw
    }

    #[must_use]
    pub fn policy(&self) -> CameraPolicy {
        self.settings.policy
    }

    #[must_use]
    pub fn is_rotating(&self) -> bool {
        self.target_yaw.is_some()
    }

    /// Free-look: turn by a horizontal pointer delta in pixels.
    ///
    /// Moving the pointer right turns the view right, which is a decreasing
    /// yaw in a right-handed, Y-up frame.
    pub fn apply_look_delta(&mut self, dx: f32) {
        let dx = if self.invert_x { -dx } else { dx };
        self.yaw = normalize_angle(self.yaw - dx * self.sensitivity);
    }

    /// Latch a quarter turn. Ignored (returns `false`) while one is running.
    pub fn request_snap(&mut self, direction: SnapDirection) -> bool {
        if self.target_yaw.is_some() {
            return false;
        }
        let target = normalize_angle(self.yaw + direction.delta());
        debug!("snap-orbit to {target:.3} rad");
        self.target_yaw = Some(target);
        true
    }

    /// Advance a running snap by one fixed step along the shortest path.
    pub fn step_snap(&mut self) {
        let Some(target) = self.target_yaw else { return };
        let delta = shortest_angle_delta(self.yaw, target);
        let step = self.settings.snap_step;
        if delta.abs() <= step {
            self.yaw = target;
            self.target_yaw = None;
        } else {
            self.yaw = normalize_angle(self.yaw + step.copysign(delta));
        }
    }

    /// Camera position for a tracked point `target`.
    #[must_use]
    pub fn placement(&self, target: Vec3) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        Vec3::new(
            target.x - sin * self.settings.distance,
            target.y + self.settings.height,
            target.z - cos * self.settings.distance,
        )
    }

    /// Full camera transform: placed by [`placement`](Self::placement) and
    /// aimed at `target`.
    #[must_use]
    pub fn pose(&self, target: Vec3) -> Transform {
        Transform::from_translation(self.placement(target)).looking_at(target, Vec3::Y)
    }
}

impl YawSource for OrbitCamera {
    fn yaw(&self) -> f32 {
        self.yaw
    }
}

/// Whether pointer motion currently belongs to the camera.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerCapture {
    captured: bool,
}

impl PointerCapture {
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Explicit user activation (click). Returns `true` if this changed state.
    pub fn capture(&mut self) -> bool {
        !std::mem::replace(&mut self.captured, true)
    }

    /// Release key or external capture loss. Returns `true` if this changed state.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.captured, false)
    }
}

fn set_cursor_locked(window: &mut Window, locked: bool) {
    if locked {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    } else {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

/// Capture the pointer on left click, release it on Escape or focus loss.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut focus: EventReader<WindowFocused>,
    mut capture: ResMut<PointerCapture>,
) {
    let Ok(mut window) = windows.get_single_mut() else { return };

    let lost_focus = focus.read().filter(|ev| !ev.focused).count() > 0;
    if (lost_focus || keys.just_pressed(RELEASE_POINTER_KEY)) && capture.release() {
        set_cursor_locked(&mut window, false);
        return;
    }

    if mouse.just_pressed(MouseButton::Left) && capture.capture() {
        set_cursor_locked(&mut window, true);
    }
}

/// Free-look: apply every pointer motion event to the camera yaw.
///
/// Motion that arrives while the pointer is not captured, or while the
/// camera uses snap-orbit, is discarded.
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    mut motion: EventReader<MouseMotion>,
    capture: Res<PointerCapture>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let Ok(mut camera) = cameras.get_single_mut() else {
        motion.clear();
        return;
    };
    if !capture.is_captured() || camera.policy() != CameraPolicy::FreeLook {
        motion.clear();
        return;
    }
    for ev in motion.read() {
        camera.apply_look_delta(ev.delta.x);
    }
}

/// Snap-orbit requests and interpolation, then placement around the player.
#[allow(clippy::needless_pass_by_value)]
pub fn orbit_camera(
    input: Res<InputState>,
    players: Query<&Transform, (With<Player>, Without<OrbitCamera>)>,
    mut cameras: Query<(&mut Transform, &mut OrbitCamera)>,
) {
    let Ok((mut transform, mut camera)) = cameras.get_single_mut() else { return };

    if camera.policy() == CameraPolicy::SnapOrbit {
        if input.is_held(Action::RotateLeft) {
            camera.request_snap(SnapDirection::Left);
        } else if input.is_held(Action::RotateRight) {
            camera.request_snap(SnapDirection::Right);
        }
        camera.step_snap();
    }

    let Ok(player) = players.get_single() else { return };
    *transform = camera.pose(player.translation);
}
