//! Error types for planar-mirror.

use thiserror::Error;

/// The main error type for mirror configuration and surface management.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Render target resolution must be a positive integer.
    #[error("invalid texture size {0} - must be greater than zero")]
    InvalidTextureSize(u32),

    /// The projection direction cannot define a plane normal.
    #[error("invalid projection direction {0:?} - must be finite and non-zero")]
    InvalidProjectionDirection([f32; 3]),

    /// The clip plane offset must be a finite, non-negative bias.
    #[error("invalid clip plane offset {0}")]
    InvalidClipPlaneOffset(f32),

    /// The near clip limit must be finite and positive.
    #[error("invalid near clip limit {0}")]
    InvalidNearClipLimit(f32),

    /// The reflection far plane must be finite and positive.
    #[error("invalid far clip distance {0}")]
    InvalidFarClip(f32),

    /// Unsupported multisample count.
    #[error("invalid MSAA sample count {0} - expected 1, 2, 4 or 8")]
    InvalidSampleCount(u32),

    /// A surface with the given name already exists.
    #[error("mirror surface '{0}' already exists")]
    SurfaceExists(String),

    /// A surface with the given name was not found.
    #[error("mirror surface '{0}' not found")]
    SurfaceNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for planar-mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
