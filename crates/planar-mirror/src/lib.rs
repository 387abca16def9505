//! planar-mirror: real-time planar mirror and portal reflections.
//!
//! A mirror surface renders the scene from a camera reflected through its
//! plane into a texture its material samples. The reflected camera uses an
//! oblique near plane so that everything behind the mirror is clipped by the
//! rasterizer.
//!
//! # Quick Start
//!
//! ```
//! use planar_mirror::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let material = shared(Material::new("glass").with_texture_property("_ReflectionTexLeft"));
//!     let mirror = MirrorSurface::new("hall mirror", MirrorSurfaceConfig::new())?
//!         .with_renderer(MeshRenderer::new(vec![material]));
//!
//!     let mut system = MirrorSystem::new();
//!     system.register(mirror)?;
//!
//!     let mut host = HeadlessHost::new();
//!     let camera = host
//!         .create_camera(CameraKind::Game)
//!         .looking_at(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO, Vec3::Y);
//!
//!     // Called by the host before it draws `camera`
//!     let mut ctx = RenderContext::default();
//!     let summary = system.on_before_camera_render(&mut ctx, &camera, &mut host, &NoTracking);
//!     assert_eq!(summary.rendered, 1);
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `mirror-core`: configuration, cameras, materials and tracking types
//! - `mirror-render`: reflection math and the per-surface orchestrator
//! - `planar-mirror`: this facade, the surface registry and a headless host

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod headless;
pub mod system;

pub use mirror_core::{
    shared, Camera, CameraId, CameraKind, ClearFlags, ClipDepth, LayerMask, Mat4, Material,
    MeshRenderer, MirrorError, MirrorSurfaceConfig, NoTracking, Quat, ReflectionPlane, Result,
    SharedMaterial, Skybox, StereoEye, StereoMatrices, StereoTargetEye, TextureHandle,
    TrackedNode, TrackingSource, Transform, Vec3, Vec4, XrNode, MIRROR_CAMERA_TAG,
};
pub use mirror_render::{
    oblique_projection, reflection_matrix, reflection_texture_property, EyeRender,
    MirrorSurface, MirrorUniforms, RenderContext, RenderError, RenderHost, RenderOutcome,
    RenderResult, SkipReason, WgpuHost,
};

pub use headless::{HeadlessHost, Submission};
pub use system::{DispatchSummary, MirrorSystem};

/// Initializes `env_logger` from `RUST_LOG`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
