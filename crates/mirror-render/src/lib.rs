//! Reflection rendering for planar-mirror.
//!
//! This crate turns a viewing camera and a mirror surface into a fully
//! configured secondary camera, including:
//! - Reflection matrices and camera-space clip planes
//! - Oblique near-plane projections
//! - Stereo eye resolution from tracked nodes
//! - Render target and secondary camera caches
//! - The per-frame [`MirrorSurface`] orchestrator driven by a [`RenderHost`]
//! - [`WgpuHost`], a host rendering into wgpu textures

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Eye indices are 0 or 1
#![allow(clippy::cast_possible_truncation)]

pub mod cache;
pub mod context;
pub mod error;
pub mod eye;
pub mod host;
pub mod oblique;
pub mod reflection;
pub mod surface;
pub mod sync;
pub mod target;
pub mod uniforms;
pub mod wgpu_host;

pub use cache::{MirrorCameraCache, MirrorCameraEntry};
pub use context::RenderContext;
pub use error::{RenderError, RenderResult};
pub use eye::{eye_node, eye_offset, eye_world_position, find_node, EyeResolver};
pub use host::RenderHost;
pub use oblique::{oblique_projection, ObliqueError};
pub use reflection::{
    camera_space_plane, plane_reflection_matrix, reflection_matrix,
    reflection_matrix_from_point_normal,
};
pub use surface::{
    reflection_texture_property, EyeRender, MirrorSurface, RenderOutcome, SkipReason,
};
pub use sync::{sync_camera_properties, REFLECTION_CAMERA_DEPTH};
pub use target::{
    create_wgpu_target, RenderTarget, RenderTargetDesc, RenderTargetPair, WgpuRenderTarget,
    REFLECTION_COLOR_FORMAT,
};
pub use uniforms::{MirrorUniformBuffer, MirrorUniforms};
pub use wgpu_host::WgpuHost;
