//! Rendering error types.

use mirror_core::{MirrorError, TextureHandle};
use thiserror::Error;

/// Errors that can occur while rendering a reflection.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The host could not allocate a render target.
    #[error("render target allocation failed: {0}")]
    TargetAllocationFailed(String),

    /// The host rejected a camera submission.
    #[error("camera submission failed: {0}")]
    SubmissionFailed(String),

    /// A texture handle is not known to the host.
    #[error("unknown render target {0}")]
    UnknownTarget(TextureHandle),

    /// No graphics adapter is available.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// The graphics device could not be created.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The surface configuration is invalid.
    #[error("invalid mirror configuration: {0}")]
    Config(#[from] MirrorError),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
