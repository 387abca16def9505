//! Copying visual state from a viewing camera to its reflection camera.

use mirror_core::{Camera, ClearFlags, Skybox, StereoTargetEye};

/// Render ordering depth of reflection cameras.
pub const REFLECTION_CAMERA_DEPTH: f32 = 2.0;

/// Copies the visual state of `src` onto `dest`.
///
/// Even with explicit matrices, the host reads some of these values elsewhere
/// (the sky uses the far plane, for instance). The far plane is forced to
/// `far_clip` and eye following is disabled so stereo auto-configuration does
/// not override the reflection's matrices. No-op when `dest` is `None`.
pub fn sync_camera_properties(src: &Camera, dest: Option<&mut Camera>, far_clip: f32) {
    let Some(dest) = dest else {
        return;
    };

    dest.clear_flags = src.clear_flags;
    dest.background_color = src.background_color;

    if src.clear_flags == ClearFlags::Skybox {
        let sky = dest.skybox.get_or_insert_with(Skybox::default);
        match src.skybox.as_ref().and_then(|s| s.material.as_ref()) {
            Some(material) => {
                sky.enabled = true;
                sky.material = Some(material.clone());
            }
            None => sky.enabled = false,
        }
    }

    dest.stereo_target_eye = StereoTargetEye::None;
    dest.far = far_clip;
    dest.near = src.near;
    dest.orthographic = src.orthographic;
    dest.fov = src.fov;
    dest.aspect_ratio = src.aspect_ratio;
    dest.ortho_size = src.ortho_size;
    dest.depth = REFLECTION_CAMERA_DEPTH;
    dest.render_post_processing = true;
}
