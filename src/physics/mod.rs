//! Physics capabilities consumed by the controller and camera.
//!
//! The controller never owns a physics engine. It talks to whatever the host
//! provides through the traits below. `sphere` and `ground` hold the small
//! stand-in used by the demo binary; any engine that can implement these
//! traits can replace them.
pub mod ground;
pub mod sphere;

use bevy::math::Vec3;

pub use ground::{GroundSurface, GroundSurfaces};
pub use sphere::{integrate_bodies, SphereBody, SphereBodyView};

/// Dynamic body driven by the movement controller.
///
/// Writes on a body that is not attached to a physics representation must be
/// silent no-ops.
pub trait PhysicsBody {
    /// Whether the body currently has a physics representation.
    fn is_attached(&self) -> bool;

    /// World-space position of the body centre.
    fn position(&self) -> Vec3;

    /// Apply an instantaneous impulse at `point` (world space).
    fn apply_impulse(&mut self, impulse: Vec3, point: Vec3);

    fn linear_velocity(&self) -> Vec3;

    fn set_linear_velocity(&mut self, velocity: Vec3);
}

/// Scene intersection query.
pub trait RayCaster {
    /// `true` if a ray from `origin` along `direction` hits anything within
    /// `max_distance`. `direction` is expected to be normalized.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool;
}

/// Provides the yaw (radians about +Y) that movement input is relative to.
pub trait YawSource {
    fn yaw(&self) -> f32;
}

impl YawSource for f32 {
    fn yaw(&self) -> f32 {
        *self
    }
}
