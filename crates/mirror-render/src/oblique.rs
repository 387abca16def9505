//! Oblique near-plane clipping.
//!
//! Rewrites the depth row of a perspective projection so that its near plane
//! coincides with an arbitrary camera-space plane. Geometry behind the mirror
//! is then rejected by the rasterizer's regular near-plane clip.
//!
//! See Lengyel, "Oblique View Frustum Depth Projection and Clipping",
//! Journal of Game Development, 2005.

use glam::{Mat4, Vec4};
use mirror_core::ClipDepth;
use thiserror::Error;

/// Smallest magnitude accepted for a divisor taken from the projection.
const MIN_DIVISOR: f32 = 1e-8;

/// Reasons an oblique projection cannot be built.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObliqueError {
    /// The bottom row is not `(0, 0, -1, 0)`, e.g. an orthographic projection.
    #[error("projection is not a right-handed perspective projection")]
    NotPerspective,

    /// A projection entry used as a divisor is zero.
    #[error("projection entry {0} is zero")]
    ZeroDivisor(&'static str),

    /// The clip plane is parallel to the far frustum corner direction.
    #[error("clip plane is degenerate for this frustum")]
    DegeneratePlane,

    /// The computation produced NaN or infinity.
    #[error("oblique projection is not finite")]
    NonFinite,
}

fn sgn(a: f32) -> f32 {
    if a > 0.0 {
        1.0
    } else if a < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn checked_divisor(value: f32, entry: &'static str) -> Result<f32, ObliqueError> {
    if value.abs() < MIN_DIVISOR {
        Err(ObliqueError::ZeroDivisor(entry))
    } else {
        Ok(value)
    }
}

/// Replaces the near plane of `projection` with `clip_plane`.
///
/// `clip_plane` is a camera-space plane `(n, d)` whose positive side is kept,
/// as produced by [`camera_space_plane`](crate::reflection::camera_space_plane).
/// Only the third row of the matrix changes; the far plane is tilted so that
/// it still passes through the original frustum's far corner.
///
/// Returns an error instead of a NaN-laden matrix for orthographic or
/// otherwise degenerate projections.
pub fn oblique_projection(
    projection: Mat4,
    clip_plane: Vec4,
    clip_depth: ClipDepth,
) -> Result<Mat4, ObliqueError> {
    if projection.row(3) != Vec4::new(0.0, 0.0, -1.0, 0.0) {
        return Err(ObliqueError::NotPerspective);
    }

    let m00 = checked_divisor(projection.x_axis.x, "m00")?;
    let m11 = checked_divisor(projection.y_axis.y, "m11")?;
    let m23 = checked_divisor(projection.w_axis.z, "m23")?;

    // Clip-space corner opposite the clip plane, (sgn(c.x), sgn(c.y), 1, 1),
    // brought back into camera space.
    let q = Vec4::new(
        (sgn(clip_plane.x) + projection.z_axis.x) / m00,
        (sgn(clip_plane.y) + projection.z_axis.y) / m11,
        -1.0,
        (1.0 + projection.z_axis.z) / m23,
    );

    let dot = clip_plane.dot(q);
    if dot.abs() < MIN_DIVISOR {
        return Err(ObliqueError::DegeneratePlane);
    }

    let row = match clip_depth {
        ClipDepth::NegOneToOne => clip_plane * (2.0 / dot) + Vec4::new(0.0, 0.0, 1.0, 0.0),
        ClipDepth::ZeroToOne => clip_plane * (1.0 / dot),
    };
    if !row.is_finite() {
        return Err(ObliqueError::NonFinite);
    }

    let mut oblique = projection;
    oblique.x_axis.z = row.x;
    oblique.y_axis.z = row.y;
    oblique.z_axis.z = row.z;
    oblique.w_axis.z = row.w;
    Ok(oblique)
}
