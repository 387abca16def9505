//! The reflection plane of a mirror surface.
//!
//! Derived every frame from the surface's world transform and configured
//! projection direction; never persisted.

use glam::{Vec3, Vec4};

use crate::transform::Transform;

/// A world-space plane `n·p + d = 0` used for mirroring and clipping.
///
/// `distance` already includes the clip bias, so the plane sits slightly
/// in front of the surface it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionPlane {
    /// World position of the surface.
    origin: Vec3,
    /// Plane normal. Not renormalized; a scaled direction scales the reflection.
    normal: Vec3,
    /// Signed distance term of the plane equation.
    distance: f32,
}

impl ReflectionPlane {
    /// Creates a plane through `origin` with the given normal and no bias.
    #[must_use]
    pub fn from_point_normal(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal,
            distance: -normal.dot(origin),
        }
    }

    /// Derives the plane of a surface.
    ///
    /// The local `projection_direction` is rotated into world space and the
    /// plane is pushed along it by `clip_plane_offset`.
    #[must_use]
    pub fn from_surface(
        transform: &Transform,
        projection_direction: Vec3,
        clip_plane_offset: f32,
    ) -> Self {
        let origin = transform.translation;
        let normal = transform.transform_direction(projection_direction);
        Self {
            origin,
            normal,
            distance: -normal.dot(origin) - clip_plane_offset,
        }
    }

    /// Returns the surface position the plane was derived from.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns the plane normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the signed distance term `d`.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Returns the plane as `(n.x, n.y, n.z, d)`.
    #[must_use]
    pub fn equation(&self) -> Vec4 {
        self.normal.extend(self.distance)
    }

    /// Evaluates the plane equation at `point`.
    ///
    /// Positive on the side the normal points to.
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Projects a point onto the plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.signed_distance(point) / self.normal.length_squared() * self.normal
    }
}
