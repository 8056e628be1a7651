//! Sphere rigid body used by the demo host.
//!
//! Gravity, ground contact with a little bounce, and a respawn when the body
//! falls off the world. Register `integrate_bodies` after the movement
//! controller so impulses from this tick are integrated right away.

use bevy::prelude::*;

use super::{GroundSurfaces, PhysicsBody};
use crate::settings::{PhysicsSettings, Settings};

/// Downward speeds slower than this come to rest instead of bouncing.
const REST_SPEED: f32 = 1.0;

/// Dynamic sphere state. The entity's `Transform` holds the position.
#[derive(Component, Debug, Clone)]
pub struct SphereBody {
    /// Linear velocity in world units per second.
    pub velocity: Vec3,
    /// `1 / mass`.
    pub inverse_mass: f32,
    pub radius: f32,
    /// Fraction of downward speed kept when bouncing off the ground.
    pub restitution: f32,
    /// `false` until the body has been handed to the physics step.
    pub attached: bool,
}

impl SphereBody {
    #[must_use]
    pub fn from_settings(settings: &PhysicsSettings) -> Self {
        Self {
            velocity: Vec3::ZERO,
            inverse_mass: 1.0 / settings.body_mass,
            radius: settings.body_radius,
            restitution: settings.restitution,
            attached: true,
        }
    }

    /// Take new mass and restitution from `settings`, keeping velocity.
    ///
    /// The radius is left alone: it matches the rendered mesh, which is only
    /// built at startup.
    pub fn retune(&mut self, settings: &PhysicsSettings) {
        self.inverse_mass = 1.0 / settings.body_mass;
        self.restitution = settings.restitution;
    }
}

/// Borrowed view pairing a body with its current position, handed to the
/// controller as a [`PhysicsBody`].
pub struct SphereBodyView<'a> {
    position: Vec3,
    body: &'a mut SphereBody,
}

impl<'a> SphereBodyView<'a> {
    pub fn new(position: Vec3, body: &'a mut SphereBody) -> Self {
        Self { position, body }
    }
}

impl PhysicsBody for SphereBodyView<'_> {
    fn is_attached(&self) -> bool {
        self.body.attached
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn apply_impulse(&mut self, impulse: Vec3, _point: Vec3) {
        // A sphere has no torque response in this model.
        if self.body.attached {
            self.body.velocity += impulse * self.body.inverse_mass;
        }
    }

    fn linear_velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.body.attached {
            self.body.velocity = velocity;
        }
    }
}

/// Advance one sphere by `dt`.
///
/// Extracted from the system so tests and benchmarks run the same step.
pub fn step_sphere(
    position: &mut Vec3,
    body: &mut SphereBody,
    ground: &GroundSurfaces,
    settings: &PhysicsSettings,
    dt: f32,
) {
    if !body.attached {
        return;
    }

    body.velocity.y += settings.gravity * dt;

    let previous_bottom = position.y - body.radius;
    let mut next = *position + body.velocity * dt;

    // Only surfaces the sphere was above last step can catch it.
    let support = ground.support_height(next.x, next.z, previous_bottom + 1e-3);
    if let Some(top) = support
        && next.y - body.radius < top
        && body.velocity.y <= 0.0
    {
        next.y = top + body.radius;
        body.velocity.y = if -body.velocity.y > REST_SPEED {
            -body.velocity.y * body.restitution
        } else {
            0.0
        };
    }

    if next.y < settings.respawn_floor {
        debug!("body fell below {:.1}, respawning", settings.respawn_floor);
        next = settings.spawn_point();
        body.velocity = Vec3::ZERO;
    }

    *position = next;
}

/// Integrate every `SphereBody` for this frame.
#[allow(clippy::needless_pass_by_value)]
pub fn integrate_bodies(
    time: Res<Time>,
    ground: Res<GroundSurfaces>,
    settings: Res<Settings>,
    mut bodies: Query<(&mut Transform, &mut SphereBody)>,
) {
    let dt = time.delta_seconds();
    if dt <= 0.0 {
        return;
    }
    for (mut transform, mut body) in &mut bodies {
        let mut position = transform.translation;
        step_sphere(&mut position, &mut body, &ground, &settings.physics, dt);
        transform.translation = position;
    }
}
