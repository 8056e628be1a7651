//! Movement controller: ground sensing, movement impulses, jump/glide and
//! velocity shaping.
//!
//! Every tick runs the same ordered pass:
//!
//! 1. sense ground
//! 2. advance the air timer (may start gliding)
//! 3. build the movement impulse from held direction keys
//! 4. rotate it by the camera yaw and apply it
//! 5. jump, edge-triggered
//! 6. slow the fall while gliding
//! 7. friction (grounded only)
//! 8. clamp horizontal speed
//!
//! Later steps read state written by earlier ones, so the order matters.

use bevy::prelude::*;

use crate::error::Result;
use crate::physics::{GroundSurfaces, PhysicsBody, RayCaster, SphereBody, SphereBodyView, YawSource};
use crate::player::camera::OrbitCamera;
use crate::player::input::{Action, InputState};
use crate::player::Player;
use crate::settings::{GroundProbe, MotionParameters};

/// Air state. Gliding while grounded cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AirState {
    Grounded,
    /// Off the ground for `air_time` seconds, not yet gliding.
    Airborne { air_time: f32 },
    Gliding { air_time: f32 },
}

impl AirState {
    /// Next state given this tick's ground contact.
    #[must_use]
    pub fn advance(self, grounded: bool, dt: f32, glide_delay: f32) -> Self {
        if grounded {
            return AirState::Grounded;
        }
        match self {
            AirState::Grounded => Self::airborne(dt, glide_delay),
            AirState::Airborne { air_time } => Self::airborne(air_time + dt, glide_delay),
            AirState::Gliding { air_time } => AirState::Gliding { air_time: air_time + dt },
        }
    }

    fn airborne(air_time: f32, glide_delay: f32) -> Self {
        if air_time >= glide_delay {
            AirState::Gliding { air_time }
        } else {
            AirState::Airborne { air_time }
        }
    }
}

/// Live controller state, mutated once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub air: AirState,
    /// Set while the jump key stays held; blocks repeat jumps.
    pub jump_locked: bool,
}

impl MotionState {
    #[must_use]
    pub fn grounded(&self) -> bool {
        matches!(self.air, AirState::Grounded)
    }

    #[must_use]
    pub fn is_gliding(&self) -> bool {
        matches!(self.air, AirState::Gliding { .. })
    }

    #[must_use]
    pub fn air_time(&self) -> f32 {
        match self.air {
            AirState::Grounded => 0.0,
            AirState::Airborne { air_time } | AirState::Gliding { air_time } => air_time,
        }
    }

    /// A fresh jump press this tick would jump.
    #[must_use]
    pub fn can_jump(&self) -> bool {
        self.grounded() && !self.jump_locked
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self { air: AirState::Grounded, jump_locked: false }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// The body had no physics representation; nothing ran.
    pub skipped: bool,
    /// Movement impulse applied this tick.
    pub impulse: Option<Vec3>,
    pub jumped: bool,
    /// Velocity was rewritten by glide, friction or clamp.
    pub velocity_written: bool,
}

/// Local-space movement intent from held direction keys.
///
/// Local +Z is forward, +X is left: with a right-handed, Y-up frame and the
/// camera looking down +Z, screen-right is -X.
#[must_use]
pub fn movement_intent(input: &InputState, move_speed: f32) -> Vec3 {
    let mut intent = Vec3::ZERO;
    if input.is_held(Action::Forward) {
        intent.z += move_speed;
    }
    if input.is_held(Action::Back) {
        intent.z -= move_speed;
    }
    if input.is_held(Action::Left) {
        intent.x += move_speed;
    }
    if input.is_held(Action::Right) {
        intent.x -= move_speed;
    }
    intent
}

/// Rotate a local intent about +Y so forward follows the camera.
#[must_use]
pub fn camera_relative(intent: Vec3, yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * intent
}

/// Scale falling velocity by `fall_rate`. Rising velocity is untouched.
#[must_use]
pub fn shape_glide_fall(velocity: Vec3, fall_rate: f32) -> Vec3 {
    if velocity.y < 0.0 {
        Vec3::new(velocity.x, velocity.y * fall_rate, velocity.z)
    } else {
        velocity
    }
}

/// Ground friction on the horizontal components.
///
/// Uses `stop_friction` with no direction key held and `move_friction`
/// otherwise. When both horizontal components end up below
/// `stop_threshold` they snap to zero.
#[must_use]
pub fn apply_friction(velocity: Vec3, params: &MotionParameters, moving: bool) -> Vec3 {
    let factor = if moving { params.move_friction } else { params.stop_friction };
    let mut x = velocity.x * factor;
    let mut z = velocity.z * factor;
    if x.abs() < params.stop_threshold && z.abs() < params.stop_threshold {
        x = 0.0;
        z = 0.0;
    }
    Vec3::new(x, velocity.y, z)
}

/// Rescale horizontal speed down to `ceiling`, keeping direction.
#[must_use]
pub fn clamp_horizontal(velocity: Vec3, ceiling: f32) -> Vec3 {
    let speed = velocity.x.hypot(velocity.z);
    if speed <= ceiling {
        return velocity;
    }
    let scale = ceiling / speed;
    Vec3::new(velocity.x * scale, velocity.y, velocity.z * scale)
}

/// Character controller for one body.
#[derive(Component, Debug, Clone)]
pub struct MovementController {
    params: MotionParameters,
    probe: GroundProbe,
    state: MotionState,
    nonfinite_reported: bool,
}

impl MovementController {
    /// # Errors
    /// Invalid tuning values.
    pub fn new(params: MotionParameters, probe: GroundProbe) -> Result<Self> {
        params.validate()?;
        probe.validate()?;
        Ok(Self {
            params,
            probe,
            state: MotionState::default(),
            nonfinite_reported: false,
        })
    }

    /// New controller with other tuning that carries over the live state.
    ///
    /// # Errors
    /// Invalid tuning values.
    pub fn rebuild(&self, params: MotionParameters, probe: GroundProbe) -> Result<Self> {
        let mut next = Self::new(params, probe)?;
        next.state = self.state;
        Ok(next)
    }

    #[must_use]
    pub fn params(&self) -> &MotionParameters {
        &self.params
    }

    #[must_use]
    pub fn probe(&self) -> &GroundProbe {
        &self.probe
    }

    #[must_use]
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Run one control tick against `body`.
    pub fn tick<B, R, Y>(
        &mut self,
        body: &mut B,
        caster: &R,
        input: &InputState,
        yaw: &Y,
        dt: f32,
    ) -> TickReport
    where
        B: PhysicsBody + ?Sized,
        R: RayCaster + ?Sized,
        Y: YawSource + ?Sized,
    {
        if !body.is_attached() {
            return TickReport { skipped: true, ..Default::default() };
        }
        let mut report = TickReport::default();
        let position = body.position();
        let params = self.params;

        // sense + air timer
        let grounded = self.probe.sense(caster, position);
        let previous = self.state.air;
        self.state.air = previous.advance(grounded, dt.max(0.0), params.glide_delay);
        log_transition(previous, self.state.air);
        let gliding = self.state.is_gliding();

        // movement impulse
        let mut intent = movement_intent(input, params.move_speed);
        if gliding {
            intent *= params.glide_speed_multiplier;
        }
        let impulse = camera_relative(intent, yaw.yaw());
        if impulse.length_squared() > 0.0 && impulse.is_finite() {
            body.apply_impulse(impulse, position);
            report.impulse = Some(impulse);
        }

        // jump
        let jump_held = input.is_held(Action::Jump);
        if jump_held && !self.state.jump_locked && grounded && params.jump_force > 0.0 {
            body.apply_impulse(Vec3::Y * params.jump_force, position);
            report.jumped = true;
            debug!("jump impulse {:.2}", params.jump_force);
        }
        self.state.jump_locked = jump_held;

        // velocity shaping
        let before = body.linear_velocity();
        let mut velocity = before;
        if gliding {
            velocity = shape_glide_fall(velocity, params.glide_fall_rate);
        }
        if grounded {
            velocity = apply_friction(velocity, &params, input.any_direction_held());
        }
        let ceiling = if gliding { params.max_glide_velocity } else { params.max_velocity };
        velocity = clamp_horizontal(velocity, ceiling);

        if velocity != before {
            if velocity.is_finite() {
                body.set_linear_velocity(velocity);
                report.velocity_written = true;
            } else if !self.nonfinite_reported {
                warn!("skipping non-finite velocity write {velocity:?} (was {before:?})");
                self.nonfinite_reported = true;
            }
        }

        report
    }
}

fn log_transition(from: AirState, to: AirState) {
    let label = |s: AirState| match s {
        AirState::Grounded => "grounded",
        AirState::Airborne { .. } => "airborne",
        AirState::Gliding { .. } => "gliding",
    };
    if std::mem::discriminant(&from) != std::mem::discriminant(&to) {
        debug!("air state {} -> {}", label(from), label(to));
    }
}

/// Stands in for a player entity that has no physics body attached yet.
struct DetachedBody(Vec3);

impl PhysicsBody for DetachedBody {
    fn is_attached(&self) -> bool {
        false
    }
    fn position(&self) -> Vec3 {
        self.0
    }
    fn apply_impulse(&mut self, _impulse: Vec3, _point: Vec3) {}
    fn linear_velocity(&self) -> Vec3 {
        Vec3::ZERO
    }
    fn set_linear_velocity(&mut self, _velocity: Vec3) {}
}

/// Run the controller tick for the player.
///
/// Silently does nothing if there is no player; uses yaw 0 if there is no
/// orbit camera.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_player(
    time: Res<Time>,
    input: Res<InputState>,
    ground: Res<GroundSurfaces>,
    cameras: Query<&OrbitCamera>,
    mut players: Query<(&Transform, Option<&mut SphereBody>, &mut MovementController), With<Player>>,
) {
    let Ok((transform, body, mut controller)) = players.get_single_mut() else { return };
    let yaw = cameras.get_single().map_or(0.0, OrbitCamera::yaw);
    let dt = time.delta_seconds();

    match body {
        Some(mut body) => {
            let mut view = SphereBodyView::new(transform.translation, &mut body);
            controller.tick(&mut view, &*ground, &input, &yaw, dt);
        }
        None => {
            controller.tick(&mut DetachedBody(transform.translation), &*ground, &input, &yaw, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Body that records impulse calls and keeps velocity as written.
    #[derive(Default)]
    struct RecordingBody {
        position: Vec3,
        velocity: Vec3,
        detached: bool,
        impulses: Vec<(Vec3, Vec3)>,
        velocity_writes: usize,
        integrate_impulses: bool,
    }

    impl PhysicsBody for RecordingBody {
        fn is_attached(&self) -> bool {
            !self.detached
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
            self.impulses.push((impulse, point));
            if self.integrate_impulses {
                self.velocity += impulse;
            }
        }
        fn linear_velocity(&self) -> Vec3 {
            self.velocity
        }
        fn set_linear_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
            self.velocity_writes += 1;
        }
    }

    /// Ground everywhere below `y = 0`, reachable within the probe length.
    struct FlatGround;

    impl RayCaster for FlatGround {
        fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
            direction.y < 0.0 && origin.y >= 0.0 && origin.y <= max_distance
        }
    }

    fn controller(params: MotionParameters) -> MovementController {
        MovementController::new(params, GroundProbe::default()).expect("valid params")
    }

    fn grounded_body() -> RecordingBody {
        RecordingBody { position: Vec3::new(0.0, 1.0, 0.0), ..Default::default() }
    }

    fn airborne_body() -> RecordingBody {
        RecordingBody { position: Vec3::new(0.0, 10.0, 0.0), ..Default::default() }
    }

    #[test]
    fn forward_at_zero_yaw_applies_one_impulse_at_body() {
        let mut c = controller(MotionParameters { move_speed: 1.2, ..Default::default() });
        let mut body = grounded_body();
        let can_jump_before = c.state().can_jump();

        let report = c.tick(&mut body, &FlatGround, &InputState::with(&[Action::Forward]), &0.0, 1.0 / 60.0);

        assert_eq!(body.impulses.len(), 1);
        let (impulse, point) = body.impulses[0];
        assert_eq!(impulse, Vec3::new(0.0, 0.0, 1.2));
        assert_eq!(impulse.y, 0.0);
        assert_eq!(point, body.position);
        assert_eq!(report.impulse, Some(impulse));
        assert_eq!(c.state().can_jump(), can_jump_before);
    }

    #[test]
    fn no_keys_means_no_impulse_call() {
        let mut c = controller(MotionParameters::default());
        let mut body = grounded_body();
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.7, 1.0 / 60.0);
        assert!(body.impulses.is_empty());
    }

    #[test]
    fn opposite_keys_cancel_without_impulse() {
        let mut c = controller(MotionParameters::default());
        let mut body = grounded_body();
        let input = InputState::with(&[Action::Forward, Action::Back, Action::Left, Action::Right]);
        c.tick(&mut body, &FlatGround, &input, &0.0, 1.0 / 60.0);
        assert!(body.impulses.is_empty());
    }

    #[test]
    fn forward_follows_camera_yaw() {
        let v = camera_relative(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
        assert!((v - Vec3::X).length() < 1e-6);
        let v = camera_relative(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::PI);
        assert!((v - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn holding_jump_fires_once() {
        let mut c = controller(MotionParameters::default());
        let mut body = grounded_body();
        let input = InputState::with(&[Action::Jump]);
        for _ in 0..30 {
            c.tick(&mut body, &FlatGround, &input, &0.0, 1.0 / 60.0);
        }
        let upward: Vec<_> = body.impulses.iter().filter(|(i, _)| i.y > 0.0).collect();
        assert_eq!(upward.len(), 1);
        assert_eq!(upward[0].0, Vec3::Y * MotionParameters::default().jump_force);
        assert!(!c.state().can_jump());
    }

    #[test]
    fn releasing_jump_rearms_it() {
        let mut c = controller(MotionParameters::default());
        let mut body = grounded_body();
        let jump = InputState::with(&[Action::Jump]);
        let none = InputState::default();
        assert!(c.tick(&mut body, &FlatGround, &jump, &0.0, 0.016).jumped);
        assert!(!c.tick(&mut body, &FlatGround, &jump, &0.0, 0.016).jumped);
        c.tick(&mut body, &FlatGround, &none, &0.0, 0.016);
        assert!(c.state().can_jump());
        assert!(c.tick(&mut body, &FlatGround, &jump, &0.0, 0.016).jumped);
    }

    #[test]
    fn no_jump_while_airborne_and_held_key_does_not_fire_on_landing() {
        let mut c = controller(MotionParameters::default());
        let mut body = airborne_body();
        let jump = InputState::with(&[Action::Jump]);
        assert!(!c.tick(&mut body, &FlatGround, &jump, &0.0, 0.016).jumped);
        body.position.y = 1.0;
        assert!(!c.tick(&mut body, &FlatGround, &jump, &0.0, 0.016).jumped);
        assert!(body.impulses.is_empty());
    }

    #[test]
    fn glide_starts_on_first_tick_reaching_delay_and_clears_on_landing() {
        let mut c = controller(MotionParameters { glide_delay: 0.5, ..Default::default() });
        let mut body = airborne_body();
        let none = InputState::default();
        let dt = 0.125;

        for tick in 1..=3 {
            c.tick(&mut body, &FlatGround, &none, &0.0, dt);
            assert!(!c.state().is_gliding(), "gliding early on tick {tick}");
        }
        c.tick(&mut body, &FlatGround, &none, &0.0, dt);
        assert!(c.state().is_gliding());
        assert_eq!(c.state().air_time(), 0.5);

        body.position.y = 1.0;
        c.tick(&mut body, &FlatGround, &none, &0.0, dt);
        assert!(!c.state().is_gliding());
        assert!(c.state().grounded());
        assert_eq!(c.state().air_time(), 0.0);
    }

    #[test]
    fn glide_slows_fall_but_not_rise() {
        let params = MotionParameters { glide_delay: 0.0, glide_fall_rate: 0.5, ..Default::default() };
        let mut c = controller(params);
        let mut body = airborne_body();
        body.velocity = Vec3::new(0.0, -4.0, 0.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert!(c.state().is_gliding());
        assert_eq!(body.velocity.y, -2.0);

        body.velocity = Vec3::new(0.0, 3.0, 0.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert_eq!(body.velocity.y, 3.0);
    }

    #[test]
    fn glide_scales_movement_impulse() {
        let params = MotionParameters {
            glide_delay: 0.0,
            move_speed: 1.0,
            glide_speed_multiplier: 2.0,
            ..Default::default()
        };
        let mut c = controller(params);
        let mut body = airborne_body();
        let report = c.tick(&mut body, &FlatGround, &InputState::with(&[Action::Forward]), &0.0, 0.016);
        assert_eq!(report.impulse, Some(Vec3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn friction_is_monotone_and_reaches_zero() {
        let params = MotionParameters::default();
        let mut v = Vec3::new(6.0, -1.0, -5.0);
        let mut ticks = 0;
        while v.x != 0.0 || v.z != 0.0 {
            let next = apply_friction(v, &params, false);
            assert!(next.x.hypot(next.z) <= v.x.hypot(v.z));
            assert_eq!(next.y, v.y);
            v = next;
            ticks += 1;
            assert!(ticks < 200, "friction never stopped the body");
        }
    }

    #[test]
    fn friction_below_threshold_snaps_in_one_tick() {
        let params = MotionParameters::default();
        let v = apply_friction(Vec3::new(0.04, 0.0, -0.03), &params, false);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn moving_friction_is_weaker() {
        let params = MotionParameters::default();
        let moving = apply_friction(Vec3::new(4.0, 0.0, 0.0), &params, true);
        let stopping = apply_friction(Vec3::new(4.0, 0.0, 0.0), &params, false);
        assert!(moving.x > stopping.x);
    }

    #[test]
    fn no_friction_in_the_air() {
        let mut c = controller(MotionParameters::default());
        let mut body = airborne_body();
        body.velocity = Vec3::new(3.0, 0.0, 0.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert_eq!(body.velocity.x, 3.0);
        assert_eq!(body.velocity_writes, 0);
    }

    #[test]
    fn clamp_is_idempotent_and_keeps_direction() {
        let v = Vec3::new(9.0, -7.0, 12.0);
        let once = clamp_horizontal(v, 8.0);
        let twice = clamp_horizontal(once, 8.0);
        assert!((once - twice).length() < 1e-5);
        assert!(once.x.hypot(once.z) <= 8.0 + 1e-4);
        assert_eq!(once.y, -7.0);
        let dir_before = Vec3::new(v.x, 0.0, v.z).normalize();
        let dir_after = Vec3::new(once.x, 0.0, once.z).normalize();
        assert!((dir_before - dir_after).length() < 1e-6);
    }

    #[test]
    fn clamp_uses_glide_ceiling_while_gliding() {
        let params = MotionParameters {
            glide_delay: 0.0,
            max_velocity: 5.0,
            max_glide_velocity: 10.0,
            ..Default::default()
        };
        let mut c = controller(params);
        let mut body = airborne_body();
        body.velocity = Vec3::new(20.0, 0.0, 0.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert!((body.velocity.x - 10.0).abs() < 1e-5);

        let mut c = controller(MotionParameters { glide_delay: 10.0, ..params });
        body.velocity = Vec3::new(20.0, 0.0, 0.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert!((body.velocity.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn detached_body_is_skipped_silently() {
        let mut c = controller(MotionParameters::default());
        let mut body = RecordingBody { detached: true, ..grounded_body() };
        let report = c.tick(&mut body, &FlatGround, &InputState::with(&[Action::Forward, Action::Jump]), &0.0, 0.016);
        assert!(report.skipped);
        assert!(body.impulses.is_empty());
        assert_eq!(body.velocity_writes, 0);
    }

    #[test]
    fn non_finite_velocity_is_never_written() {
        let mut c = controller(MotionParameters::default());
        let mut body = grounded_body();
        body.velocity = Vec3::new(f32::NAN, 0.0, 1.0);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        c.tick(&mut body, &FlatGround, &InputState::default(), &0.0, 0.016);
        assert_eq!(body.velocity_writes, 0);
        assert!(c.nonfinite_reported);
    }

    #[test]
    fn walking_reaches_but_never_exceeds_max_velocity() {
        let params = MotionParameters::default();
        let mut c = controller(params);
        let mut body = RecordingBody { integrate_impulses: true, ..grounded_body() };
        let input = InputState::with(&[Action::Forward, Action::Left]);
        for _ in 0..600 {
            c.tick(&mut body, &FlatGround, &input, &1.0, 1.0 / 60.0);
            assert!(body.velocity.x.hypot(body.velocity.z) <= params.max_velocity + 1e-4);
        }
        assert!(body.velocity.x.hypot(body.velocity.z) > params.max_velocity * 0.5);
    }

    #[test]
    fn invalid_params_fail_construction() {
        let bad = MotionParameters { max_velocity: 0.0, ..Default::default() };
        assert!(MovementController::new(bad, GroundProbe::default()).is_err());
    }

    #[test]
    fn rebuild_keeps_live_state() {
        let mut c = controller(MotionParameters::default());
        let mut body = airborne_body();
        c.tick(&mut body, &FlatGround, &InputState::with(&[Action::Jump]), &0.0, 0.1);
        let next = c
            .rebuild(MotionParameters { move_speed: 2.0, ..Default::default() }, GroundProbe::default())
            .unwrap();
        assert_eq!(next.state(), c.state());
        assert_eq!(next.params().move_speed, 2.0);
    }
}
