//! Planar reflection utilities.

use glam::{Mat4, Vec3, Vec4};
use mirror_core::ReflectionPlane;

/// Computes the reflection matrix for a plane equation `(n.x, n.y, n.z, d)`.
///
/// The normal is used as given. For a unit normal the result is an
/// involution that leaves every point on the plane fixed.
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let n = plane.truncate();
    let d = plane.w;

    // | 1-2nx²   -2nxny   -2nxnz   -2nxd |
    // | -2nxny   1-2ny²   -2nynz   -2nyd |
    // | -2nxnz   -2nynz   1-2nz²   -2nzd |
    // |    0        0        0       1   |

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
        Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
    )
}

/// Computes the reflection matrix across a plane given by a point and normal.
///
/// The normal is normalized first.
pub fn reflection_matrix_from_point_normal(plane_point: Vec3, plane_normal: Vec3) -> Mat4 {
    let n = plane_normal.normalize();
    reflection_matrix(n.extend(-plane_point.dot(n)))
}

/// Computes the reflection matrix of a mirror surface's plane.
pub fn plane_reflection_matrix(plane: &ReflectionPlane) -> Mat4 {
    reflection_matrix(plane.equation())
}

/// Transforms a world-space plane into camera space.
///
/// The plane point is pushed `clip_offset` along the normal before the
/// transform. `side_sign` flips which half-space is kept. The returned
/// `(n, d)` satisfies `n·p + d > 0` for kept camera-space points.
pub fn camera_space_plane(
    world_to_camera: Mat4,
    plane_point: Vec3,
    plane_normal: Vec3,
    side_sign: f32,
    clip_offset: f32,
) -> Vec4 {
    let offset_point = plane_point + plane_normal * clip_offset;
    let camera_point = world_to_camera.transform_point3(offset_point);
    let camera_normal = world_to_camera.transform_vector3(plane_normal).normalize() * side_sign;
    camera_normal.extend(-camera_point.dot(camera_normal))
}
