//! Ground contact sensing.
//!
//! One short ray straight down from just above the body centre, once per
//! tick. No smoothing: a single-tick flicker at a surface boundary is
//! tolerated by the controller.

use bevy::math::Vec3;

use crate::physics::RayCaster;
use crate::settings::GroundProbe;

/// `true` if a downward ray starting `vertical_offset` above `position` hits
/// anything within `probe_distance`.
pub fn is_grounded<R: RayCaster + ?Sized>(
    caster: &R,
    position: Vec3,
    probe_distance: f32,
    vertical_offset: f32,
) -> bool {
    let origin = Vec3::new(position.x, position.y + vertical_offset, position.z);
    caster.cast_ray(origin, Vec3::NEG_Y, probe_distance)
}

impl GroundProbe {
    /// Probe below `position` with this geometry.
    pub fn sense<R: RayCaster + ?Sized>(&self, caster: &R, position: Vec3) -> bool {
        is_grounded(caster, position, self.distance, self.vertical_offset)
    }
}
