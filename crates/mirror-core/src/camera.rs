//! Camera state shared between the host renderer and mirror surfaces.
//!
//! A [`Camera`] carries everything the host needs to rasterize a view: world
//! transform, view and projection matrices (derived or explicitly overridden),
//! culling mask, clear behavior and the texture it renders into.

use std::fmt;

use glam::{Mat4, Vec3, Vec4};

use crate::layer::LayerMask;
use crate::material::TextureHandle;
use crate::transform::Transform;

/// Tag carried by every secondary camera created for a mirror surface.
pub const MIRROR_CAMERA_TAG: &str = "PortalCam";

/// Stable identity of a camera known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

/// What a camera is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraKind {
    /// A camera rendering the running scene.
    #[default]
    Game,
    /// The editor's scene view camera.
    SceneView,
    /// Thumbnail/preview rendering.
    Preview,
    /// A secondary camera owned by a mirror surface.
    Reflection,
}

/// How a camera clears its target before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearFlags {
    /// Clear to the sky backdrop.
    #[default]
    Skybox,
    /// Clear to the background color.
    SolidColor,
    /// Clear depth only.
    Depth,
    /// Do not clear.
    Nothing,
}

/// Clip-space depth range produced by a projection matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipDepth {
    /// OpenGL convention, depth in `[-1, 1]`.
    NegOneToOne,
    /// wgpu/D3D/Vulkan convention, depth in `[0, 1]`.
    #[default]
    ZeroToOne,
}

/// Sky backdrop component of a camera.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Skybox {
    /// Whether the sky is drawn.
    pub enabled: bool,
    /// Name of the sky material, if any.
    pub material: Option<String>,
}

impl Skybox {
    /// Creates an enabled skybox using the given material.
    pub fn with_material(material: impl Into<String>) -> Self {
        Self {
            enabled: true,
            material: Some(material.into()),
        }
    }
}

/// One eye of a stereo camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoEye {
    /// Left eye.
    Left,
    /// Right eye.
    Right,
}

impl StereoEye {
    /// Both eyes in render order.
    pub const ALL: [StereoEye; 2] = [StereoEye::Left, StereoEye::Right];

    /// Returns the display name, also used to build material property names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StereoEye::Left => "Left",
            StereoEye::Right => "Right",
        }
    }

    /// Returns the slot index (0 = left, 1 = right).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            StereoEye::Left => 0,
            StereoEye::Right => 1,
        }
    }
}

impl fmt::Display for StereoEye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which eye(s) a camera follows when stereo auto-configuration is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StereoTargetEye {
    /// Follow both eyes.
    #[default]
    Both,
    /// Follow the left eye only.
    Left,
    /// Follow the right eye only.
    Right,
    /// Do not follow any eye.
    None,
}

/// Per-eye view and projection matrices of a stereo camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoMatrices {
    /// World-to-eye matrices, indexed by [`StereoEye::index`].
    pub view: [Mat4; 2],
    /// Per-eye projection matrices.
    pub projection: [Mat4; 2],
}

/// A camera as seen by the host renderer.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Host-assigned identity.
    pub id: CameraId,
    /// Display name.
    pub name: String,
    /// What this camera is used for.
    pub kind: CameraKind,
    /// Free-form tag.
    pub tag: String,
    /// World transform.
    pub transform: Transform,
    /// Whether the host renders this camera automatically each frame.
    pub enabled: bool,
    /// Whether the camera is saved with the scene.
    pub persistent: bool,
    /// Clear behavior.
    pub clear_flags: ClearFlags,
    /// Color used by [`ClearFlags::SolidColor`].
    pub background_color: Vec4,
    /// Sky component, if the camera has one.
    pub skybox: Option<Skybox>,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Whether the camera uses an orthographic projection.
    pub orthographic: bool,
    /// Half height of the orthographic view volume.
    pub ortho_size: f32,
    /// Clip-space depth convention of derived projection matrices.
    pub clip_depth: ClipDepth,
    /// Layers this camera renders.
    pub culling_mask: LayerMask,
    /// Texture the camera renders into (`None` = the host's back buffer).
    pub target_texture: Option<TextureHandle>,
    /// Per-eye matrices when stereo rendering is active.
    pub stereo: Option<StereoMatrices>,
    /// Eye-following behavior.
    pub stereo_target_eye: StereoTargetEye,
    /// Render ordering depth.
    pub depth: f32,
    /// Whether post-processing runs for this camera.
    pub render_post_processing: bool,
    view_override: Option<Mat4>,
    projection_override: Option<Mat4>,
}

impl Camera {
    /// Creates a perspective camera at the origin looking down -Z.
    pub fn new(id: CameraId, kind: CameraKind) -> Self {
        Self {
            id,
            name: format!("{id}"),
            kind,
            tag: String::new(),
            transform: Transform::identity(),
            enabled: true,
            persistent: true,
            clear_flags: ClearFlags::Skybox,
            background_color: Vec4::new(0.19, 0.30, 0.47, 0.0),
            skybox: None,
            fov: 60f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.3,
            far: 1000.0,
            orthographic: false,
            ortho_size: 5.0,
            clip_depth: ClipDepth::ZeroToOne,
            culling_mask: LayerMask::ALL,
            target_texture: None,
            stereo: None,
            stereo_target_eye: StereoTargetEye::Both,
            depth: 0.0,
            render_post_processing: false,
            view_override: None,
            projection_override: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the world transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Places the camera at `eye` looking at `target`.
    #[must_use]
    pub fn looking_at(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.transform = Transform::looking_at(eye, target, up);
        self
    }

    /// Enables stereo rendering with explicit per-eye matrices.
    #[must_use]
    pub fn with_stereo(mut self, stereo: StereoMatrices) -> Self {
        self.stereo = Some(stereo);
        self
    }

    /// Returns the world position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// Returns the world forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Returns whether this camera renders both eyes.
    #[must_use]
    pub fn stereo_enabled(&self) -> bool {
        self.stereo.is_some()
    }

    /// Returns whether this camera belongs to a mirror surface.
    #[must_use]
    pub fn is_mirror_camera(&self) -> bool {
        self.kind == CameraKind::Reflection || self.tag == MIRROR_CAMERA_TAG
    }

    /// Returns the world-to-camera matrix.
    ///
    /// Uses the explicit override when one is set, otherwise derives it from
    /// the transform (scale ignored).
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_override.unwrap_or_else(|| {
            Mat4::from_rotation_translation(self.transform.rotation, self.transform.translation)
                .inverse()
        })
    }

    /// Overrides the world-to-camera matrix.
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view_override = Some(view);
    }

    /// Returns to deriving the view matrix from the transform.
    pub fn reset_view_matrix(&mut self) {
        self.view_override = None;
    }

    /// Returns whether the view matrix is explicitly overridden.
    #[must_use]
    pub fn has_view_override(&self) -> bool {
        self.view_override.is_some()
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_override
            .unwrap_or_else(|| self.derived_projection_matrix())
    }

    /// Overrides the projection matrix.
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection_override = Some(projection);
    }

    /// Returns to deriving the projection from the camera parameters.
    pub fn reset_projection_matrix(&mut self) {
        self.projection_override = None;
    }

    /// Returns the world-to-eye matrix for one eye.
    ///
    /// Monoscopic cameras return their regular view matrix.
    #[must_use]
    pub fn stereo_view_matrix(&self, eye: StereoEye) -> Mat4 {
        self.stereo
            .map_or_else(|| self.view_matrix(), |s| s.view[eye.index()])
    }

    /// Returns the projection matrix for one eye.
    #[must_use]
    pub fn stereo_projection_matrix(&self, eye: StereoEye) -> Mat4 {
        self.stereo
            .map_or_else(|| self.projection_matrix(), |s| s.projection[eye.index()])
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn derived_projection_matrix(&self) -> Mat4 {
        if self.orthographic {
            let half_height = self.ortho_size;
            let half_width = half_height * self.aspect_ratio;
            match self.clip_depth {
                ClipDepth::NegOneToOne => Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                ),
                ClipDepth::ZeroToOne => Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                ),
            }
        } else {
            match self.clip_depth {
                ClipDepth::NegOneToOne => {
                    Mat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near, self.far)
                }
                ClipDepth::ZeroToOne => {
                    Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
                }
            }
        }
    }
}
