//! Core data model for planar-mirror.
//!
//! This crate provides the types shared by the reflection renderer and its host:
//! - [`MirrorSurfaceConfig`] for user-authored surface settings
//! - [`Camera`] and its clear, stereo and projection state
//! - [`Material`] and [`MeshRenderer`] for publishing reflection textures
//! - [`TrackedNode`] and [`TrackingSource`] for stereo eye poses
//! - [`ReflectionPlane`] derived from a surface transform

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Config structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod config;
pub mod error;
pub mod layer;
pub mod material;
pub mod plane;
pub mod tracking;
pub mod transform;

pub use camera::{
    Camera, CameraId, CameraKind, ClearFlags, ClipDepth, Skybox, StereoEye, StereoMatrices,
    StereoTargetEye, MIRROR_CAMERA_TAG,
};
pub use config::{MirrorSurfaceConfig, DEFAULT_REFLECTION_FAR_CLIP};
pub use error::{MirrorError, Result};
pub use layer::{LayerMask, MAX_LAYERS};
pub use material::{shared, Material, MeshRenderer, SharedMaterial, TextureHandle};
pub use plane::ReflectionPlane;
pub use tracking::{NoTracking, TrackedNode, TrackingSource, XrNode};
pub use transform::Transform;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec3, Vec4};
