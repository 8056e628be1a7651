//! Static ground geometry for the demo host.
//!
//! Ground is a list of horizontal rectangles. That is all the ground sensor
//! and the sphere integration need to answer "is there floor here".

use bevy::math::{Vec2, Vec3};
use bevy::prelude::Resource;

use super::RayCaster;

/// Horizontal, axis-aligned rectangle of walkable ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSurface {
    /// Centre of the top face.
    pub center: Vec3,
    /// Half size along X and Z.
    pub half_extents: Vec2,
}

impl GroundSurface {
    #[must_use]
    pub fn new(center: Vec3, size: Vec2) -> Self {
        Self { center, half_extents: size * 0.5 }
    }

    /// Whether `(x, z)` lies over this surface (edges inclusive).
    #[must_use]
    pub fn covers(&self, x: f32, z: f32) -> bool {
        (x - self.center.x).abs() <= self.half_extents.x
            && (z - self.center.z).abs() <= self.half_extents.y
    }

    /// Distance along the ray to this surface's plane, if it is hit within
    /// `max_distance`.
    #[must_use]
    pub fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        if direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let t = (self.center.y - origin.y) / direction.y;
        if !(0.0..=max_distance).contains(&t) {
            return None;
        }
        let hit = origin + direction * t;
        self.covers(hit.x, hit.z).then_some(t)
    }
}

/// All static ground in the scene.
#[derive(Resource, Debug, Clone, Default)]
pub struct GroundSurfaces(pub Vec<GroundSurface>);

impl GroundSurfaces {
    /// Highest surface top at or below `y` under `(x, z)`.
    #[must_use]
    pub fn support_height(&self, x: f32, z: f32, y: f32) -> Option<f32> {
        self.0
            .iter()
            .filter(|s| s.covers(x, z) && s.center.y <= y)
            .map(|s| s.center.y)
            .reduce(f32::max)
    }
}

impl RayCaster for GroundSurfaces {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        self.0
            .iter()
            .any(|s| s.intersect(origin, direction, max_distance).is_some())
    }
}
